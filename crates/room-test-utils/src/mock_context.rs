//! Mock room context.
//!
//! Records `leave`/`end` and listener (un)registration in the shared
//! [`CallLog`], and lets tests push room and seat events to whatever
//! listeners are currently registered.

use crate::call_log::{Call, CallLog};
use crate::script::{ScriptQueue, Scripted};
use async_trait::async_trait;
use common::types::{ListenerId, RoomId};
use room_controller::services::{
    RoomContext, RoomEvent, RoomEventListener, SeatEvent, SeatEventListener,
};
use room_controller::ServiceError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock room context for one entered room.
pub struct MockRoomContext {
    room_id: RoomId,
    log: CallLog,
    leave_scripts: Mutex<ScriptQueue>,
    end_scripts: Mutex<ScriptQueue>,
    room_listeners: Mutex<HashMap<ListenerId, Arc<dyn RoomEventListener>>>,
    seat_listeners: Mutex<HashMap<ListenerId, Arc<dyn SeatEventListener>>>,
}

impl MockRoomContext {
    /// Leave and end succeed immediately.
    #[must_use]
    pub fn new(room_id: RoomId, log: CallLog) -> Self {
        Self::with_scripts(room_id, log, Scripted::success(), Scripted::success())
    }

    /// Leave and end complete with the given scripts.
    #[must_use]
    pub fn with_scripts(room_id: RoomId, log: CallLog, leave: Scripted, end: Scripted) -> Self {
        Self {
            room_id,
            log,
            leave_scripts: Mutex::new(ScriptQueue::new(leave)),
            end_scripts: Mutex::new(ScriptQueue::new(end)),
            room_listeners: Mutex::new(HashMap::new()),
            seat_listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver a room event to every registered room listener.
    pub fn emit_room_event(&self, event: RoomEvent) {
        let listeners: Vec<_> = self
            .room_listeners
            .lock()
            .expect("listeners poisoned")
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener.on_room_event(event.clone());
        }
    }

    /// Deliver a seat event to every registered seat listener.
    pub fn emit_seat_event(&self, event: SeatEvent) {
        let listeners: Vec<_> = self
            .seat_listeners
            .lock()
            .expect("listeners poisoned")
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener.on_seat_event(event.clone());
        }
    }

    /// Number of registered room listeners.
    #[must_use]
    pub fn room_listener_count(&self) -> usize {
        self.room_listeners.lock().expect("listeners poisoned").len()
    }

    /// Number of registered seat listeners.
    #[must_use]
    pub fn seat_listener_count(&self) -> usize {
        self.seat_listeners.lock().expect("listeners poisoned").len()
    }

    /// Number of `leave` calls recorded for this room.
    #[must_use]
    pub fn leave_count(&self) -> usize {
        self.log.count(&Call::Leave(self.room_id.clone()))
    }
}

#[async_trait]
impl RoomContext for MockRoomContext {
    fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    async fn leave(&self) -> Result<(), ServiceError> {
        self.log.record(Call::Leave(self.room_id.clone()));
        let script = self.leave_scripts.lock().expect("script queue poisoned").next();
        script.run().await
    }

    async fn end(&self, force: bool) -> Result<(), ServiceError> {
        self.log.record(Call::EndContext {
            room_id: self.room_id.clone(),
            force,
        });
        let script = self.end_scripts.lock().expect("script queue poisoned").next();
        script.run().await
    }

    fn add_room_listener(&self, listener: Arc<dyn RoomEventListener>) -> ListenerId {
        self.log.record(Call::AddRoomListener(self.room_id.clone()));
        let id = ListenerId::new();
        self.room_listeners
            .lock()
            .expect("listeners poisoned")
            .insert(id, listener);
        id
    }

    fn remove_room_listener(&self, id: ListenerId) -> bool {
        self.log.record(Call::RemoveRoomListener(self.room_id.clone()));
        self.room_listeners
            .lock()
            .expect("listeners poisoned")
            .remove(&id)
            .is_some()
    }

    fn add_seat_listener(&self, listener: Arc<dyn SeatEventListener>) -> ListenerId {
        self.log.record(Call::AddSeatListener(self.room_id.clone()));
        let id = ListenerId::new();
        self.seat_listeners
            .lock()
            .expect("listeners poisoned")
            .insert(id, listener);
        id
    }

    fn remove_seat_listener(&self, id: ListenerId) -> bool {
        self.log.record(Call::RemoveSeatListener(self.room_id.clone()));
        self.seat_listeners
            .lock()
            .expect("listeners poisoned")
            .remove(&id)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl RoomEventListener for Counting {
        fn on_room_event(&self, _event: RoomEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_events_reach_registered_listeners_only() {
        let context = MockRoomContext::new(RoomId::new("R1"), CallLog::new());
        let listener = Arc::new(Counting::default());

        let id = context.add_room_listener(Arc::clone(&listener) as Arc<dyn RoomEventListener>);
        context.emit_room_event(RoomEvent::MemberLeft {
            user_id: "bob".to_string(),
        });
        assert!(context.remove_room_listener(id));
        assert!(!context.remove_room_listener(id));
        context.emit_room_event(RoomEvent::MemberLeft {
            user_id: "bob".to_string(),
        });

        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
        assert_eq!(context.room_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_leave_is_recorded() {
        let log = CallLog::new();
        let context = MockRoomContext::with_scripts(
            RoomId::new("R1"),
            log.clone(),
            Scripted::failure(500, "leave-err"),
            Scripted::success(),
        );

        assert!(context.leave().await.is_err());
        assert_eq!(context.leave_count(), 1);
    }
}
