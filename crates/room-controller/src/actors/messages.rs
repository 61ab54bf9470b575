//! Message types for the controller actor.
//!
//! All requests reach the actor through a `tokio::sync::mpsc` mailbox.
//! Request-reply uses `tokio::sync::oneshot`.

use super::metrics::SessionCountersSnapshot;
use crate::errors::RoomError;
use crate::models::{CreateRoomParams, JoinRequest, RoomInfo};
use crate::services::{RoomEvent, SeatEvent};
use chrono::{DateTime, Utc};
use common::types::{LiveRecordId, RoomId};
use serde::Serialize;
use std::fmt;
use tokio::sync::oneshot;

/// Messages sent to the controller actor.
#[derive(Debug)]
pub enum ControllerMessage {
    /// Create a room remotely and remember its metadata as pending.
    CreateRoom {
        params: CreateRoomParams,
        respond_to: oneshot::Sender<Result<RoomInfo, RoomError>>,
    },

    /// Join a room, leaving any live session first.
    JoinRoom {
        request: JoinRequest,
        respond_to: oneshot::Sender<Result<RoomInfo, RoomError>>,
    },

    /// Leave the live session.
    LeaveRoom {
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },

    /// End the live room for every participant.
    EndRoom {
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },

    /// The remote end request spawned by `EndRoom` resolved.
    EndRoomCompleted {
        live_record_id: LiveRecordId,
        result: Result<(), RoomError>,
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Tear down local session state without contacting any collaborator.
    Reset { respond_to: oneshot::Sender<()> },

    /// Metadata fetched for a live record; replaces the live session's
    /// metadata when the record matches.
    RoomInfoFetched { info: RoomInfo },

    /// Metadata of the live session, if any.
    CurrentRoomInfo {
        respond_to: oneshot::Sender<Option<RoomInfo>>,
    },

    /// Get controller status.
    GetStatus {
        respond_to: oneshot::Sender<ControllerStatus>,
    },

    /// An event delivered by a listener registered on the live context.
    Listener { room_id: RoomId, event: ListenerEvent },

    /// Tear down the live session and stop the actor.
    Shutdown {
        respond_to: oneshot::Sender<Result<(), RoomError>>,
    },
}

/// Controller state machine.
///
/// `Idle -> Joining -> Joined -> Leaving -> Idle` and
/// `Joined -> Ending -> Idle`. A failed join returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Joining,
    Joined,
    Leaving,
    Ending,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Joining => "joining",
            SessionState::Joined => "joined",
            SessionState::Leaving => "leaving",
            SessionState::Ending => "ending",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event forwarded from a context listener into the mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Room(RoomEvent),
    Seat(SeatEvent),
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Explicit `leave_room`, including the implicit leave before a rejoin.
    Left,
    /// Explicit `end_room`.
    Ended,
    /// The room was ended by someone else.
    RemoteEnded,
    /// Explicit `reset`.
    Reset,
    /// Controller shutdown.
    Shutdown,
}

/// Notification published to subscribers of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomNotification {
    /// Room-level event of the live session.
    Room { room_id: RoomId, event: RoomEvent },
    /// Seat event of the live session.
    Seat { room_id: RoomId, event: SeatEvent },
    /// The live session was torn down.
    SessionClosed { room_id: RoomId, reason: CloseReason },
}

/// Controller status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    pub controller_id: String,
    pub state: SessionState,
    /// Room of the live session.
    pub room_id: Option<RoomId>,
    /// When the live session was joined.
    pub joined_at: Option<DateTime<Utc>>,
    /// Number of listeners currently registered on the live context.
    pub listener_count: usize,
    /// Room created by the latest `create_room` and not joined yet.
    pub pending_room: Option<RoomId>,
    pub counters: SessionCountersSnapshot,
    pub mailbox_depth: usize,
    pub mailbox_peak_depth: usize,
}
