//! Mock room directory.
//!
//! Keeps an in-memory table of rooms keyed by live record, hands out a fresh
//! [`MockRoomContext`] for every `enter`, and records every call in the
//! shared [`CallLog`].
//!
//! # Example
//!
//! ```rust,ignore
//! use room_test_utils::*;
//!
//! let log = CallLog::new();
//! let directory = MockDirectory::new(log.clone())
//!     .with_room(room_info("R1", 42));
//! directory.set_remote_end(Scripted::failure(500, "end-err"));
//! ```

use crate::call_log::{Call, CallLog};
use crate::mock_context::MockRoomContext;
use crate::script::{ScriptQueue, Scripted};
use async_trait::async_trait;
use common::types::{LiveRecordId, RoomId};
use room_controller::models::{
    CreateRoomDefaults, CreateRoomParams, JoinRequest, LiveState, RoomInfo, RoomList,
};
use room_controller::services::{RoomContext, RoomDirectory};
use room_controller::ServiceError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// Code returned by `fetch_info` for an unknown live record.
pub const ROOM_NOT_FOUND: i32 = 404;

/// Mock room directory.
pub struct MockDirectory {
    log: CallLog,
    rooms: Mutex<BTreeMap<LiveRecordId, RoomInfo>>,
    next_record: AtomicI64,
    enter_scripts: Mutex<ScriptQueue>,
    fetch_scripts: Mutex<ScriptQueue>,
    end_scripts: Mutex<ScriptQueue>,
    context_leave: Mutex<Scripted>,
    context_end: Mutex<Scripted>,
    contexts: Mutex<Vec<Arc<MockRoomContext>>>,
}

impl MockDirectory {
    /// Every call succeeds immediately; the room table is empty.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            rooms: Mutex::new(BTreeMap::new()),
            next_record: AtomicI64::new(1000),
            enter_scripts: Mutex::new(ScriptQueue::default()),
            fetch_scripts: Mutex::new(ScriptQueue::default()),
            end_scripts: Mutex::new(ScriptQueue::default()),
            context_leave: Mutex::new(Scripted::success()),
            context_end: Mutex::new(Scripted::success()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Add a room to the table.
    #[must_use]
    pub fn with_room(self, info: RoomInfo) -> Self {
        self.add_room(info);
        self
    }

    /// Add a room to the table. Rooms without a live record are ignored.
    pub fn add_room(&self, info: RoomInfo) {
        if let Some(live_record_id) = info.live_record_id {
            self.rooms
                .lock()
                .expect("rooms poisoned")
                .insert(live_record_id, info);
        }
    }

    /// The next `enter` completes with `script` before a context is handed out.
    pub fn script_enter(&self, script: Scripted) {
        self.enter_scripts
            .lock()
            .expect("script queue poisoned")
            .push(script);
    }

    /// The next `fetch_info` completes with `script` before the table lookup.
    pub fn script_fetch_info(&self, script: Scripted) {
        self.fetch_scripts
            .lock()
            .expect("script queue poisoned")
            .push(script);
    }

    /// Every remote `end` completes with `script`.
    pub fn set_remote_end(&self, script: Scripted) {
        self.end_scripts
            .lock()
            .expect("script queue poisoned")
            .set_fallback(script);
    }

    /// Contexts entered from now on complete `leave` with `script`.
    pub fn set_context_leave(&self, script: Scripted) {
        *self.context_leave.lock().expect("script poisoned") = script;
    }

    /// Contexts entered from now on complete `end` with `script`.
    pub fn set_context_end(&self, script: Scripted) {
        *self.context_end.lock().expect("script poisoned") = script;
    }

    /// Every context handed out so far, in order.
    #[must_use]
    pub fn contexts(&self) -> Vec<Arc<MockRoomContext>> {
        self.contexts.lock().expect("contexts poisoned").clone()
    }

    /// Most recent context handed out for `room_id`.
    #[must_use]
    pub fn context(&self, room_id: &str) -> Option<Arc<MockRoomContext>> {
        self.contexts
            .lock()
            .expect("contexts poisoned")
            .iter()
            .rev()
            .find(|c| c.room_id().as_str() == room_id)
            .cloned()
    }
}

#[async_trait]
impl RoomDirectory for MockDirectory {
    async fn create(&self, params: &CreateRoomParams) -> Result<RoomInfo, ServiceError> {
        self.log.record(Call::Create {
            name: params.name.clone(),
        });

        let record = self.next_record.fetch_add(1, Ordering::SeqCst);
        let info = RoomInfo {
            room_id: RoomId::new(format!("room-{record}")),
            live_record_id: Some(LiveRecordId(record)),
            name: params.name.clone(),
            live_type: params.live_type,
            live_state: LiveState::NotStarted,
            anchor: None,
            cover: params.cover.clone(),
            audience_count: 0,
            seat_count: params.seat_count,
        };
        self.add_room(info.clone());
        Ok(info)
    }

    async fn fetch_info(&self, live_record_id: LiveRecordId) -> Result<RoomInfo, ServiceError> {
        self.log.record(Call::FetchInfo(live_record_id));
        let script = self.fetch_scripts.lock().expect("script queue poisoned").next();
        script.run().await?;

        self.rooms
            .lock()
            .expect("rooms poisoned")
            .get(&live_record_id)
            .cloned()
            .ok_or_else(|| ServiceError::new(ROOM_NOT_FOUND, "room not found"))
    }

    async fn fetch_defaults(&self) -> Result<CreateRoomDefaults, ServiceError> {
        self.log.record(Call::FetchDefaults);
        Ok(CreateRoomDefaults {
            topic: "Evening chat".to_string(),
            cover: Some("cover-1.png".to_string()),
            default_covers: vec!["cover-1.png".to_string(), "cover-2.png".to_string()],
        })
    }

    async fn list_rooms(
        &self,
        state: LiveState,
        page_num: u32,
        page_size: u32,
    ) -> Result<RoomList, ServiceError> {
        self.log.record(Call::ListRooms {
            page_num,
            page_size,
        });

        if page_num == 0 || page_size == 0 {
            return Err(ServiceError::new(400, "page numbers start at 1"));
        }

        let matching: Vec<RoomInfo> = self
            .rooms
            .lock()
            .expect("rooms poisoned")
            .values()
            .filter(|info| info.live_state == state)
            .cloned()
            .collect();

        let skip = ((page_num - 1) * page_size) as usize;
        let rooms: Vec<RoomInfo> = matching
            .iter()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect();
        let has_next_page = matching.len() > skip + rooms.len();

        Ok(RoomList {
            page_num,
            has_next_page,
            rooms,
        })
    }

    async fn end(&self, live_record_id: LiveRecordId) -> Result<(), ServiceError> {
        self.log.record(Call::RemoteEnd(live_record_id));
        let script = self.end_scripts.lock().expect("script queue poisoned").next();
        script.run().await?;

        if let Some(info) = self
            .rooms
            .lock()
            .expect("rooms poisoned")
            .get_mut(&live_record_id)
        {
            info.live_state = LiveState::Ended;
        }
        Ok(())
    }

    async fn enter(&self, request: &JoinRequest) -> Result<Arc<dyn RoomContext>, ServiceError> {
        self.log.record(Call::Enter(request.room_id.clone()));
        let script = self.enter_scripts.lock().expect("script queue poisoned").next();
        script.run().await?;

        let leave = self.context_leave.lock().expect("script poisoned").clone();
        let end = self.context_end.lock().expect("script poisoned").clone();
        let context = Arc::new(MockRoomContext::with_scripts(
            request.room_id.clone(),
            self.log.clone(),
            leave,
            end,
        ));
        self.contexts
            .lock()
            .expect("contexts poisoned")
            .push(Arc::clone(&context));

        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::room_info;
    use room_controller::models::LiveType;

    #[tokio::test]
    async fn test_create_then_fetch() {
        let directory = MockDirectory::new(CallLog::new());
        let created = directory
            .create(&CreateRoomParams {
                name: "Friday".to_string(),
                live_type: LiveType::Voice,
                cover: None,
                seat_count: 8,
            })
            .await
            .unwrap();

        let live_record_id = created.live_record_id.unwrap();
        let fetched = directory.fetch_info(live_record_id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_fetch_unknown_record() {
        let directory = MockDirectory::new(CallLog::new());
        let err = directory.fetch_info(LiveRecordId(9)).await.unwrap_err();
        assert_eq!(err.code, ROOM_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_rooms_paginates() {
        let directory = MockDirectory::new(CallLog::new())
            .with_room(room_info("A", 1))
            .with_room(room_info("B", 2))
            .with_room(room_info("C", 3));

        let first = directory.list_rooms(LiveState::Live, 1, 2).await.unwrap();
        assert_eq!(first.rooms.len(), 2);
        assert!(first.has_next_page);

        let second = directory.list_rooms(LiveState::Live, 2, 2).await.unwrap();
        assert_eq!(second.rooms.len(), 1);
        assert!(!second.has_next_page);
    }

    #[tokio::test]
    async fn test_enter_hands_out_fresh_contexts() {
        let log = CallLog::new();
        let directory = MockDirectory::new(log.clone());
        let request = JoinRequest::new(
            "R1",
            "alice",
            room_controller::models::Role::Audience,
        );

        directory.enter(&request).await.unwrap();
        directory.enter(&request).await.unwrap();

        assert_eq!(directory.contexts().len(), 2);
        assert!(directory.context("R1").is_some());
        assert_eq!(log.count(&Call::Enter(RoomId::new("R1"))), 2);
    }
}
