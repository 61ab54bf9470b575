//! Plain data records exchanged with the room directory and the channels.
//!
//! These types carry no behavior beyond construction helpers.

use crate::errors::CODE_SUCCESS;
use common::types::{LiveRecordId, RoomId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a participant joins the room with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Room owner; may end the room.
    Host,
    /// Listener.
    Audience,
}

impl Role {
    /// Returns the role as a string for logs and wire parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Audience => "audience",
        }
    }
}

/// The two transports joined as part of entering a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Real-time media transport.
    Realtime,
    /// Text/event (chatroom) transport.
    Event,
}

impl ChannelKind {
    /// Returns the channel as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Realtime => "realtime",
            ChannelKind::Event => "event",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion of one channel join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelJoinResult {
    /// Which channel reported.
    pub channel: ChannelKind,
    /// `0` on success.
    pub code: i32,
    /// Channel-supplied message.
    pub message: Option<String>,
}

impl ChannelJoinResult {
    /// A successful join.
    #[must_use]
    pub fn succeeded(channel: ChannelKind) -> Self {
        Self {
            channel,
            code: CODE_SUCCESS,
            message: None,
        }
    }

    /// A failed join.
    #[must_use]
    pub fn failed(channel: ChannelKind, code: i32, message: Option<String>) -> Self {
        Self {
            channel,
            code,
            message,
        }
    }

    /// Whether the channel joined.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

/// Identifiers of a room session, fixed once the session exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomIdentity {
    pub room_id: RoomId,
    /// Needed to end the room remotely; rooms entered without one cannot be ended.
    pub live_record_id: Option<LiveRecordId>,
}

/// Input to one join attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub room_id: RoomId,
    pub display_name: String,
    pub role: Role,
    /// When present, room metadata is fetched for this record after the join.
    pub live_record_id: Option<LiveRecordId>,
}

impl JoinRequest {
    /// Create a join request without a live record.
    #[must_use]
    pub fn new(room_id: impl Into<RoomId>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            room_id: room_id.into(),
            display_name: display_name.into(),
            role,
            live_record_id: None,
        }
    }

    /// Attach the live record whose metadata describes the room.
    #[must_use]
    pub fn with_live_record_id(mut self, live_record_id: LiveRecordId) -> Self {
        self.live_record_id = Some(live_record_id);
        self
    }
}

/// Live status of a room, used to filter directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveState {
    NotStarted,
    Live,
    Ended,
}

/// Kind of room experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveType {
    Voice,
    ListenTogether,
}

/// Owner of a room as described by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAnchor {
    pub user_uuid: String,
    pub user_name: Option<String>,
    pub icon: Option<String>,
}

/// Read-only snapshot of room metadata returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub live_record_id: Option<LiveRecordId>,
    pub name: String,
    pub live_type: LiveType,
    pub live_state: LiveState,
    pub anchor: Option<RoomAnchor>,
    pub cover: Option<String>,
    pub audience_count: u32,
    pub seat_count: u32,
}

impl RoomInfo {
    /// Metadata known about a room entered without a live record.
    #[must_use]
    pub fn minimal(room_id: RoomId) -> Self {
        Self {
            name: room_id.to_string(),
            room_id,
            live_record_id: None,
            live_type: LiveType::Voice,
            live_state: LiveState::Live,
            anchor: None,
            cover: None,
            audience_count: 0,
            seat_count: 0,
        }
    }
}

/// Parameters for creating a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomParams {
    pub name: String,
    pub live_type: LiveType,
    pub cover: Option<String>,
    pub seat_count: u32,
}

/// Defaults the directory suggests for a new room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomDefaults {
    pub topic: String,
    pub cover: Option<String>,
    pub default_covers: Vec<String>,
}

/// One page of a room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomList {
    pub page_num: u32,
    pub has_next_page: bool,
    pub rooms: Vec<RoomInfo>,
}

/// Flags applied to the realtime channel before joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcParameters {
    pub record_audio: bool,
    pub record_video: bool,
}
