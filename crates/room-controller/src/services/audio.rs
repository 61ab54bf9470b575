//! Audio playback resource held for the life of a room session.

use common::types::RoomId;

/// Per-room audio playback service (background music, effects).
///
/// `prepare` is called before the channel joins; `destroy` exactly once when
/// the session or the failed attempt is torn down.
pub trait AudioPlayback: Send + Sync {
    /// Allocate playback for `room_id`.
    fn prepare(&self, room_id: &RoomId);

    /// Release playback for `room_id`.
    fn destroy(&self, room_id: &RoomId);
}
