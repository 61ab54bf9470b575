//! Common data types for room session components.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a room as issued by the room directory.
///
/// Opaque to the client; compared by value only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wrap a directory-issued room identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of the server-side live record backing a room.
///
/// Required to terminate a room remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveRecordId(pub i64);

impl fmt::Display for LiveRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a listener registered on a room context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    /// Create a new random listener ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let id = RoomId::new("room-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"room-42\"");
        assert_eq!(id.to_string(), "room-42");
    }

    #[test]
    fn test_live_record_id_serializes_as_number() {
        let id: LiveRecordId = serde_json::from_str("1001").unwrap();
        assert_eq!(id, LiveRecordId(1001));
    }

    #[test]
    fn test_listener_ids_are_unique() {
        assert_ne!(ListenerId::new(), ListenerId::new());
    }
}
