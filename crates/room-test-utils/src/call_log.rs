//! Shared, ordered record of every collaborator call made by the controller.
//!
//! All mocks built from one [`CallLog`] append to the same list, so tests can
//! assert on ordering across collaborators (for example, that the previous
//! room was left before the next room was entered).

use common::types::{LiveRecordId, RoomId};
use std::sync::{Arc, Mutex};

/// One collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    // Directory
    Create { name: String },
    FetchInfo(LiveRecordId),
    FetchDefaults,
    ListRooms { page_num: u32, page_size: u32 },
    RemoteEnd(LiveRecordId),
    Enter(RoomId),

    // Channels
    SetParameters(RoomId),
    RealtimeJoin(RoomId),
    EventJoin(RoomId),
    RealtimeLeave(RoomId),
    EventLeave(RoomId),

    // Room context
    Leave(RoomId),
    EndContext { room_id: RoomId, force: bool },
    AddRoomListener(RoomId),
    RemoveRoomListener(RoomId),
    AddSeatListener(RoomId),
    RemoveSeatListener(RoomId),

    // Audio
    AudioPrepare(RoomId),
    AudioDestroy(RoomId),
}

/// Cloneable handle to a shared call list.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn record(&self, call: Call) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    /// Snapshot of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of recorded calls equal to `call`.
    #[must_use]
    pub fn count(&self, call: &Call) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    /// Number of recorded calls matching `predicate`.
    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    /// Whether `call` was recorded at least once.
    #[must_use]
    pub fn contains(&self, call: &Call) -> bool {
        self.count(call) > 0
    }

    /// Index of the first occurrence of `call`.
    #[must_use]
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .position(|c| c == call)
    }

    /// Index of the last occurrence of `call`.
    #[must_use]
    pub fn last_position(&self, call: &Call) -> Option<usize> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .iter()
            .rposition(|c| c == call)
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.calls.lock().expect("call log poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_list() {
        let log = CallLog::new();
        let other = log.clone();

        log.record(Call::Enter(RoomId::new("A")));
        other.record(Call::Leave(RoomId::new("A")));
        log.record(Call::Enter(RoomId::new("B")));

        assert_eq!(log.calls().len(), 3);
        assert_eq!(other.position(&Call::Leave(RoomId::new("A"))), Some(1));
        assert_eq!(log.count_where(|c| matches!(c, Call::Enter(_))), 2);
    }
}
