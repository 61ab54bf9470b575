//! Pre-configured test data and a harness wiring every mock together.

use crate::call_log::CallLog;
use crate::mock_audio::MockAudioPlayback;
use crate::mock_channels::{MockEventChannel, MockRealtimeChannel};
use crate::mock_directory::MockDirectory;
use common::types::{LiveRecordId, RoomId};
use room_controller::models::{
    CreateRoomParams, JoinRequest, LiveState, LiveType, Role, RoomAnchor, RoomInfo,
};
use room_controller::services::{AudioPlayback, EventChannel, RealtimeChannel, RoomDirectory};
use room_controller::{Config, RoomServices, RoomSessionControllerHandle};
use std::sync::Arc;
use std::time::Duration;

/// Configuration with short timeouts for tests.
#[must_use]
pub fn test_config() -> Config {
    Config {
        controller_id: "room-test".to_string(),
        channel_join_timeout: Duration::from_secs(2),
        leave_timeout: Duration::from_secs(1),
        end_timeout: Duration::from_secs(2),
        remote_call_timeout: Duration::from_secs(2),
        mailbox_capacity: 16,
        event_buffer: 64,
        rtc_record_audio: true,
        rtc_record_video: false,
    }
}

/// A live room with a live record.
#[must_use]
pub fn room_info(room_id: &str, live_record_id: i64) -> RoomInfo {
    RoomInfo {
        room_id: RoomId::new(room_id),
        live_record_id: Some(LiveRecordId(live_record_id)),
        name: format!("Room {room_id}"),
        live_type: LiveType::Voice,
        live_state: LiveState::Live,
        anchor: Some(RoomAnchor {
            user_uuid: "host-uuid".to_string(),
            user_name: Some("host".to_string()),
            icon: None,
        }),
        cover: None,
        audience_count: 3,
        seat_count: 8,
    }
}

/// `alice` joining `room_id` as audience.
#[must_use]
pub fn audience_request(room_id: &str) -> JoinRequest {
    JoinRequest::new(room_id, "alice", Role::Audience)
}

/// `host` joining `room_id` with a live record, as host.
#[must_use]
pub fn host_request(room_id: &str, live_record_id: i64) -> JoinRequest {
    JoinRequest::new(room_id, "host", Role::Host).with_live_record_id(LiveRecordId(live_record_id))
}

/// Parameters for a voice room.
#[must_use]
pub fn create_params(name: &str) -> CreateRoomParams {
    CreateRoomParams {
        name: name.to_string(),
        live_type: LiveType::Voice,
        cover: None,
        seat_count: 8,
    }
}

/// Every mock sharing one call log.
pub struct TestHarness {
    pub log: CallLog,
    pub directory: Arc<MockDirectory>,
    pub realtime: Arc<MockRealtimeChannel>,
    pub event: Arc<MockEventChannel>,
    pub audio: Arc<MockAudioPlayback>,
}

impl TestHarness {
    /// Mocks where every call succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        let log = CallLog::new();
        Self {
            directory: Arc::new(MockDirectory::new(log.clone())),
            realtime: Arc::new(MockRealtimeChannel::new(log.clone())),
            event: Arc::new(MockEventChannel::new(log.clone())),
            audio: Arc::new(MockAudioPlayback::new(log.clone())),
            log,
        }
    }

    /// Collaborator bundle for a controller.
    #[must_use]
    pub fn services(&self) -> RoomServices {
        RoomServices {
            directory: Arc::clone(&self.directory) as Arc<dyn RoomDirectory>,
            realtime: Arc::clone(&self.realtime) as Arc<dyn RealtimeChannel>,
            event: Arc::clone(&self.event) as Arc<dyn EventChannel>,
            audio: Arc::clone(&self.audio) as Arc<dyn AudioPlayback>,
        }
    }

    /// Spawn a controller with [`test_config`].
    #[must_use]
    pub fn spawn(&self) -> RoomSessionControllerHandle {
        self.spawn_with(test_config())
    }

    /// Spawn a controller with `config`.
    #[must_use]
    pub fn spawn_with(&self, config: Config) -> RoomSessionControllerHandle {
        RoomSessionControllerHandle::new(config, self.services())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
