//! Mock realtime and event channels.
//!
//! Each join is recorded in the shared [`CallLog`] when it is issued, then
//! completes according to the next queued [`Scripted`] entry.
//!
//! # Example
//!
//! ```rust,ignore
//! use room_test_utils::*;
//!
//! let log = CallLog::new();
//! let realtime = MockRealtimeChannel::new(log.clone())
//!     .then(Scripted::failure(101, "rtc-err").after(Duration::from_millis(20)));
//! ```

use crate::call_log::{Call, CallLog};
use crate::script::{ScriptQueue, Scripted};
use async_trait::async_trait;
use room_controller::models::{Role, RtcParameters};
use room_controller::services::{EventChannel, RealtimeChannel, RoomContext};
use room_controller::ServiceError;
use std::sync::Mutex;

/// Mock realtime (media) channel.
#[derive(Debug)]
pub struct MockRealtimeChannel {
    log: CallLog,
    scripts: Mutex<ScriptQueue>,
    parameters: Mutex<Vec<RtcParameters>>,
    roles: Mutex<Vec<Role>>,
}

impl MockRealtimeChannel {
    /// Every join succeeds immediately.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            scripts: Mutex::new(ScriptQueue::default()),
            parameters: Mutex::new(Vec::new()),
            roles: Mutex::new(Vec::new()),
        }
    }

    /// Every join without a queued script completes with `script`.
    #[must_use]
    pub fn with_default(self, script: Scripted) -> Self {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .set_fallback(script);
        self
    }

    /// The next join completes with `script`.
    #[must_use]
    pub fn then(self, script: Scripted) -> Self {
        self.push(script);
        self
    }

    /// Queue a script after construction.
    pub fn push(&self, script: Scripted) {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .push(script);
    }

    /// Parameters applied so far, in order.
    #[must_use]
    pub fn parameters(&self) -> Vec<RtcParameters> {
        self.parameters.lock().expect("parameters poisoned").clone()
    }

    /// Roles joined with so far, in order.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.roles.lock().expect("roles poisoned").clone()
    }
}

#[async_trait]
impl RealtimeChannel for MockRealtimeChannel {
    async fn join(&self, context: &dyn RoomContext, role: Role) -> Result<(), ServiceError> {
        self.log.record(Call::RealtimeJoin(context.room_id().clone()));
        self.roles.lock().expect("roles poisoned").push(role);
        let script = self.scripts.lock().expect("script queue poisoned").next();
        script.run().await
    }

    async fn leave(&self, context: &dyn RoomContext) -> Result<(), ServiceError> {
        self.log.record(Call::RealtimeLeave(context.room_id().clone()));
        Ok(())
    }

    fn set_parameters(&self, context: &dyn RoomContext, parameters: &RtcParameters) {
        self.log.record(Call::SetParameters(context.room_id().clone()));
        self.parameters
            .lock()
            .expect("parameters poisoned")
            .push(*parameters);
    }
}

/// Mock event (chatroom) channel.
#[derive(Debug)]
pub struct MockEventChannel {
    log: CallLog,
    scripts: Mutex<ScriptQueue>,
}

impl MockEventChannel {
    /// Every join succeeds immediately.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            scripts: Mutex::new(ScriptQueue::default()),
        }
    }

    /// Every join without a queued script completes with `script`.
    #[must_use]
    pub fn with_default(self, script: Scripted) -> Self {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .set_fallback(script);
        self
    }

    /// The next join completes with `script`.
    #[must_use]
    pub fn then(self, script: Scripted) -> Self {
        self.push(script);
        self
    }

    /// Queue a script after construction.
    pub fn push(&self, script: Scripted) {
        self.scripts
            .lock()
            .expect("script queue poisoned")
            .push(script);
    }
}

#[async_trait]
impl EventChannel for MockEventChannel {
    async fn join_chatroom(&self, context: &dyn RoomContext) -> Result<(), ServiceError> {
        self.log.record(Call::EventJoin(context.room_id().clone()));
        let script = self.scripts.lock().expect("script queue poisoned").next();
        script.run().await
    }

    async fn leave(&self, context: &dyn RoomContext) -> Result<(), ServiceError> {
        self.log.record(Call::EventLeave(context.room_id().clone()));
        Ok(())
    }
}
