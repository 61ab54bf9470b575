//! Room context: the opaque handle for an entered room.
//!
//! The context owns the underlying connection. It invokes registered
//! listeners from its own tasks; listeners must not block.

use super::ServiceError;
use async_trait::async_trait;
use common::types::{ListenerId, RoomId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Established connection to a room.
#[async_trait]
pub trait RoomContext: Send + Sync {
    /// Room this context belongs to.
    fn room_id(&self) -> &RoomId;

    /// Leave the room, disconnecting both channels.
    async fn leave(&self) -> Result<(), ServiceError>;

    /// Terminate the room for every participant.
    async fn end(&self, force: bool) -> Result<(), ServiceError>;

    /// Register a room-level listener.
    fn add_room_listener(&self, listener: Arc<dyn RoomEventListener>) -> ListenerId;

    /// Remove a room-level listener. Returns false if it was not registered.
    fn remove_room_listener(&self, id: ListenerId) -> bool;

    /// Register a seat listener.
    fn add_seat_listener(&self, listener: Arc<dyn SeatEventListener>) -> ListenerId;

    /// Remove a seat listener. Returns false if it was not registered.
    fn remove_seat_listener(&self, id: ListenerId) -> bool;
}

/// Receives room-level events from a context.
pub trait RoomEventListener: Send + Sync {
    fn on_room_event(&self, event: RoomEvent);
}

/// Receives seat events from a context.
pub trait SeatEventListener: Send + Sync {
    fn on_seat_event(&self, event: SeatEvent);
}

/// Room-level event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    MemberJoined {
        user_id: String,
        user_name: Option<String>,
    },
    MemberLeft {
        user_id: String,
    },
    ChatMessage {
        from_user_id: String,
        text: String,
    },
    /// The room was ended remotely; the local session is torn down.
    RoomEnded {
        reason: String,
    },
    RealtimeDisconnected {
        code: i32,
    },
}

/// Status of one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Open,
    Waiting,
    Taken,
    Closed,
}

/// One seat (speaking position) in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatItem {
    pub index: u32,
    pub user_id: Option<String>,
    pub status: SeatStatus,
}

/// Seat/position event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeatEvent {
    SeatListChanged { seats: Vec<SeatItem> },
    SeatRequestSubmitted { index: u32, user_id: String },
    SeatKicked { index: u32, user_id: String },
}
