//! Mock audio playback.

use crate::call_log::{Call, CallLog};
use common::types::RoomId;
use room_controller::services::AudioPlayback;

/// Mock audio playback that only records prepare/destroy.
#[derive(Debug, Clone)]
pub struct MockAudioPlayback {
    log: CallLog,
}

impl MockAudioPlayback {
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }

    /// Number of `prepare` calls.
    #[must_use]
    pub fn prepared_count(&self) -> usize {
        self.log.count_where(|c| matches!(c, Call::AudioPrepare(_)))
    }

    /// Number of `destroy` calls.
    #[must_use]
    pub fn destroyed_count(&self) -> usize {
        self.log.count_where(|c| matches!(c, Call::AudioDestroy(_)))
    }

    /// Playback resources prepared and not yet destroyed.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.prepared_count().saturating_sub(self.destroyed_count())
    }
}

impl AudioPlayback for MockAudioPlayback {
    fn prepare(&self, room_id: &RoomId) {
        self.log.record(Call::AudioPrepare(room_id.clone()));
    }

    fn destroy(&self, room_id: &RoomId) {
        self.log.record(Call::AudioDestroy(room_id.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_tracks_prepare_and_destroy() {
        let audio = MockAudioPlayback::new(CallLog::new());
        let room = RoomId::new("R1");

        audio.prepare(&room);
        assert_eq!(audio.outstanding(), 1);
        audio.destroy(&room);
        assert_eq!(audio.outstanding(), 0);
        assert_eq!(audio.prepared_count(), 1);
    }
}
