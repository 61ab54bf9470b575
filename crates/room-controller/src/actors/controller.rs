//! `RoomSessionController` - the single entry point for room sessions.
//!
//! The controller is an actor: every state transition and every mutation of
//! the live [`RoomSession`] happens on its message loop, so no two joins,
//! leaves, or ends run concurrently against one controller. Channel joins are
//! the only work that runs in parallel; they are fanned out by the
//! [`JoinCoordinator`] and fanned back in before the loop continues.
//!
//! # State machine
//!
//! ```text
//! Idle -> Joining -> Joined -> Leaving -> Idle
//!                    Joined -> Ending  -> Idle
//! Joining -> Idle (join failed, rolled back)
//! ```
//!
//! # Ending a room
//!
//! `end_room` force-ends the context and tears down local state right away.
//! The remote end request runs in a spawned task; the controller stays
//! `Ending` until it resolves and the caller receives its result.

use crate::config::Config;
use crate::errors::{Outcome, RoomError};
use crate::models::{
    CreateRoomDefaults, CreateRoomParams, JoinRequest, LiveState, RoomIdentity, RoomInfo, RoomList,
};
use crate::observability;
use crate::services::{call_with_timeout, RoomEvent, RoomServices, ServiceError};

use super::coordinator::JoinCoordinator;
use super::messages::{
    CloseReason, ControllerMessage, ControllerStatus, ListenerEvent, RoomNotification,
    SessionState,
};
use super::metrics::{MailboxMonitor, SessionCounters};
use super::session::{ListenerRegistry, PlaybackLease, RoomSession};

use common::types::{LiveRecordId, RoomId};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Handle to the `RoomSessionController` actor.
///
/// Cheap to clone. Every room operation resolves exactly once with an
/// [`Outcome`]; failures never escape as panics or a second channel.
#[derive(Clone)]
pub struct RoomSessionControllerHandle {
    controller_id: String,
    sender: mpsc::Sender<ControllerMessage>,
    cancel_token: CancellationToken,
    state: watch::Receiver<SessionState>,
    notifications: broadcast::Sender<RoomNotification>,
    mailbox: Arc<MailboxMonitor>,
    /// Used directly by the read-only directory queries.
    services: RoomServices,
    remote_call_timeout: Duration,
}

impl RoomSessionControllerHandle {
    /// Spawn a controller actor and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: Config, services: RoomServices) -> Self {
        let (sender, receiver) = mpsc::channel(config.mailbox_capacity);
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (notifications, _) = broadcast::channel(config.event_buffer);
        let cancel_token = CancellationToken::new();
        let mailbox = Arc::new(MailboxMonitor::new(config.controller_id.clone()));

        let controller_id = config.controller_id.clone();
        let remote_call_timeout = config.remote_call_timeout;

        let actor = RoomSessionController::new(
            config,
            services.clone(),
            receiver,
            sender.downgrade(),
            cancel_token.clone(),
            state_tx,
            notifications.clone(),
            Arc::clone(&mailbox),
        );

        tokio::spawn(actor.run());

        Self {
            controller_id,
            sender,
            cancel_token,
            state: state_rx,
            notifications,
            mailbox,
            services,
            remote_call_timeout,
        }
    }

    /// Create a room. The room is not joined.
    pub async fn create_room(&self, params: CreateRoomParams) -> Outcome<RoomInfo> {
        self.request("create_room", |respond_to| ControllerMessage::CreateRoom {
            params,
            respond_to,
        })
        .await
    }

    /// Join a room, leaving the live session first if there is one.
    pub async fn join_room(&self, request: JoinRequest) -> Outcome<RoomInfo> {
        self.request("join_room", |respond_to| ControllerMessage::JoinRoom {
            request,
            respond_to,
        })
        .await
    }

    /// Leave the live session. Local state is cleared even if the leave fails.
    pub async fn leave_room(&self) -> Outcome<()> {
        self.request("leave_room", |respond_to| ControllerMessage::LeaveRoom {
            respond_to,
        })
        .await
    }

    /// End the live room for every participant.
    pub async fn end_room(&self) -> Outcome<()> {
        self.request("end_room", |respond_to| ControllerMessage::EndRoom { respond_to })
            .await
    }

    /// Tear down local session state. Idempotent.
    pub async fn reset(&self) -> Outcome<()> {
        let (tx, rx) = oneshot::channel();
        let result = match self.send(ControllerMessage::Reset { respond_to: tx }).await {
            Ok(()) => rx
                .await
                .map_err(|e| RoomError::Internal(format!("response receive failed: {e}"))),
            Err(err) => Err(err),
        };
        log_outcome("reset", result)
    }

    /// Metadata of the live session, `None` when no room is joined.
    pub async fn current_room_info(&self) -> Outcome<Option<RoomInfo>> {
        let (tx, rx) = oneshot::channel();
        let result = match self
            .send(ControllerMessage::CurrentRoomInfo { respond_to: tx })
            .await
        {
            Ok(()) => rx
                .await
                .map_err(|e| RoomError::Internal(format!("response receive failed: {e}"))),
            Err(err) => Err(err),
        };
        Outcome::from(result)
    }

    /// Fetch metadata for a live record.
    ///
    /// The fetch runs on the caller's task. A successful result for the live
    /// session's record also refreshes the session metadata.
    pub async fn room_info(&self, live_record_id: LiveRecordId) -> Outcome<RoomInfo> {
        let outcome = self
            .remote_query(
                "fetch_room_info",
                self.services.directory.fetch_info(live_record_id),
            )
            .await;

        if let Some(info) = outcome.payload() {
            let refreshed = ControllerMessage::RoomInfoFetched { info: info.clone() };
            if let Err(err) = self.send(refreshed).await {
                debug!(
                    target: "room.controller.api",
                    controller_id = %self.controller_id,
                    error = %err,
                    "Controller gone, metadata not refreshed"
                );
            }
        }
        outcome
    }

    /// Fetch the defaults suggested for a new room.
    pub async fn create_room_defaults(&self) -> Outcome<CreateRoomDefaults> {
        self.remote_query("fetch_defaults", self.services.directory.fetch_defaults())
            .await
    }

    /// List rooms in `state`.
    pub async fn list_rooms(
        &self,
        state: LiveState,
        page_num: u32,
        page_size: u32,
    ) -> Outcome<RoomList> {
        self.remote_query(
            "list_rooms",
            self.services.directory.list_rooms(state, page_num, page_size),
        )
        .await
    }

    /// Get the current controller status.
    pub async fn status(&self) -> Result<ControllerStatus, RoomError> {
        let (tx, rx) = oneshot::channel();
        self.send(ControllerMessage::GetStatus { respond_to: tx })
            .await?;

        rx.await
            .map_err(|e| RoomError::Internal(format!("response receive failed: {e}")))
    }

    /// Current state of the session state machine.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Subscribe to room, seat, and session-closed notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RoomNotification> {
        self.notifications.subscribe()
    }

    /// Leave any live session and stop the actor.
    pub async fn shutdown(&self) -> Outcome<()> {
        self.request("shutdown", |respond_to| ControllerMessage::Shutdown {
            respond_to,
        })
        .await
    }

    /// Cancel the actor. An in-flight join is rolled back.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn send(&self, message: ControllerMessage) -> Result<(), RoomError> {
        self.sender
            .send(message)
            .await
            .map_err(|e| RoomError::Internal(format!("channel send failed: {e}")))?;

        self.mailbox.observe(
            self.sender
                .max_capacity()
                .saturating_sub(self.sender.capacity()),
        );
        Ok(())
    }

    async fn request<T>(
        &self,
        operation: &'static str,
        build: impl FnOnce(oneshot::Sender<Result<T, RoomError>>) -> ControllerMessage,
    ) -> Outcome<T> {
        info!(
            target: "room.controller.api",
            controller_id = %self.controller_id,
            operation,
            "Room operation requested"
        );

        let (tx, rx) = oneshot::channel();
        let result = match self.send(build(tx)).await {
            Ok(()) => match rx.await {
                Ok(result) => result,
                Err(e) => Err(RoomError::Internal(format!("response receive failed: {e}"))),
            },
            Err(err) => Err(err),
        };

        log_outcome(operation, result)
    }

    async fn remote_query<T, F>(&self, operation: &'static str, call: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        info!(
            target: "room.controller.api",
            controller_id = %self.controller_id,
            operation,
            "Room operation requested"
        );

        let result = call_with_timeout(operation, self.remote_call_timeout, call).await;
        observability::record_remote_call(operation, call_status(&result));
        log_outcome(operation, result)
    }
}

/// Report the end of a public operation and convert it to an outcome.
fn log_outcome<T>(operation: &'static str, result: Result<T, RoomError>) -> Outcome<T> {
    match &result {
        Ok(_) => {
            info!(
                target: "room.controller.api",
                operation,
                "Room operation succeeded"
            );
        }
        Err(err) => {
            warn!(
                target: "room.controller.api",
                operation,
                code = err.error_code(),
                message = err.client_message().as_deref().unwrap_or(""),
                error = %err,
                "Room operation failed"
            );
        }
    }
    Outcome::from(result)
}

/// Status label for `room_remote_calls_total`.
fn call_status<T>(result: &Result<T, RoomError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(RoomError::Timeout { .. }) => "timeout",
        Err(_) => "error",
    }
}

/// The `RoomSessionController` actor.
///
/// Owns the at-most-one live session and its listener registrations.
pub struct RoomSessionController {
    config: Config,
    services: RoomServices,
    receiver: mpsc::Receiver<ControllerMessage>,
    /// Weak so that dropping every handle closes the mailbox.
    mailbox: mpsc::WeakSender<ControllerMessage>,
    cancel_token: CancellationToken,
    coordinator: JoinCoordinator,
    session: Option<RoomSession>,
    listeners: ListenerRegistry,
    /// Metadata from the latest `create_room`, consumed by the matching join.
    pending: Option<RoomInfo>,
    state: watch::Sender<SessionState>,
    notifications: broadcast::Sender<RoomNotification>,
    counters: Arc<SessionCounters>,
    mailbox_monitor: Arc<MailboxMonitor>,
}

impl RoomSessionController {
    #[allow(clippy::too_many_arguments)]
    fn new(
        config: Config,
        services: RoomServices,
        receiver: mpsc::Receiver<ControllerMessage>,
        mailbox: mpsc::WeakSender<ControllerMessage>,
        cancel_token: CancellationToken,
        state: watch::Sender<SessionState>,
        notifications: broadcast::Sender<RoomNotification>,
        mailbox_monitor: Arc<MailboxMonitor>,
    ) -> Self {
        let counters = SessionCounters::new();
        let coordinator = JoinCoordinator::new(
            Arc::clone(&services.realtime),
            Arc::clone(&services.event),
            config.channel_join_timeout,
            config.leave_timeout,
            Arc::clone(&counters),
        );

        Self {
            config,
            services,
            receiver,
            mailbox,
            cancel_token,
            coordinator,
            session: None,
            listeners: ListenerRegistry::new(),
            pending: None,
            state,
            notifications,
            counters,
            mailbox_monitor,
        }
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "room.controller", fields(controller_id = %self.config.controller_id))]
    async fn run(mut self) {
        info!(
            target: "room.controller",
            controller_id = %self.config.controller_id,
            "RoomSessionController started"
        );

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "room.controller",
                        controller_id = %self.config.controller_id,
                        "RoomSessionController received cancellation signal"
                    );
                    self.teardown(CloseReason::Shutdown).await;
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            let flow = self.handle_message(message).await;
                            self.counters.record_message_processed();
                            if flow.is_break() {
                                break;
                            }
                        }
                        None => {
                            info!(
                                target: "room.controller",
                                controller_id = %self.config.controller_id,
                                "RoomSessionController channel closed, exiting"
                            );
                            self.teardown(CloseReason::Shutdown).await;
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "room.controller",
            controller_id = %self.config.controller_id,
            messages_processed = self.counters.snapshot().messages_processed,
            "RoomSessionController stopped"
        );
    }

    async fn handle_message(&mut self, message: ControllerMessage) -> ControlFlow<()> {
        match message {
            ControllerMessage::CreateRoom { params, respond_to } => {
                let result = self.create_room(params).await;
                let _ = respond_to.send(result);
            }

            ControllerMessage::JoinRoom {
                request,
                respond_to,
            } => {
                let result = self.join_room(request).await;
                let _ = respond_to.send(result);
            }

            ControllerMessage::LeaveRoom { respond_to } => {
                let result = self.leave_room(CloseReason::Left).await;
                let _ = respond_to.send(result);
            }

            ControllerMessage::EndRoom { respond_to } => {
                self.end_room(respond_to).await;
            }

            ControllerMessage::EndRoomCompleted {
                live_record_id,
                result,
                respond_to,
            } => {
                self.end_room_completed(live_record_id, &result);
                let _ = respond_to.send(result);
            }

            ControllerMessage::Reset { respond_to } => {
                self.reset(CloseReason::Reset);
                let _ = respond_to.send(());
            }

            ControllerMessage::RoomInfoFetched { info } => {
                self.refresh_metadata(info);
            }

            ControllerMessage::CurrentRoomInfo { respond_to } => {
                let info = self.session.as_ref().map(|s| s.metadata().clone());
                let _ = respond_to.send(info);
            }

            ControllerMessage::GetStatus { respond_to } => {
                let _ = respond_to.send(self.status());
            }

            ControllerMessage::Listener { room_id, event } => {
                self.handle_listener_event(room_id, event);
            }

            ControllerMessage::Shutdown { respond_to } => {
                info!(
                    target: "room.controller",
                    controller_id = %self.config.controller_id,
                    "Shutdown requested"
                );
                self.teardown(CloseReason::Shutdown).await;
                self.cancel_token.cancel();
                let _ = respond_to.send(Ok(()));
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn current_state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(
                target: "room.controller",
                from = %previous,
                to = %next,
                "Session state changed"
            );
        }
    }

    async fn create_room(&mut self, params: CreateRoomParams) -> Result<RoomInfo, RoomError> {
        let result = call_with_timeout(
            "create_room",
            self.config.remote_call_timeout,
            self.services.directory.create(&params),
        )
        .await;
        observability::record_remote_call("create_room", call_status(&result));

        let info = result?;
        debug!(
            target: "room.controller",
            room_id = %info.room_id,
            "Room created, metadata kept until joined"
        );
        self.pending = Some(info.clone());
        Ok(info)
    }

    async fn join_room(&mut self, request: JoinRequest) -> Result<RoomInfo, RoomError> {
        if self.current_state() == SessionState::Ending {
            return Err(RoomError::Precondition(
                "Room is ending; wait for it to finish before joining".to_string(),
            ));
        }

        self.counters.record_join_attempt();
        let started = Instant::now();

        // Taken before the leave below, which clears it
        let pending = self
            .pending
            .take()
            .filter(|info| info.room_id == request.room_id);

        // Serialize: the previous session is fully torn down before any new call
        if let Some(previous) = self.session.as_ref().map(|s| s.room_id().clone()) {
            info!(
                target: "room.controller",
                previous_room_id = %previous,
                room_id = %request.room_id,
                "Leaving current room before joining"
            );
            if let Err(err) = self.leave_room(CloseReason::Left).await {
                warn!(
                    target: "room.controller",
                    room_id = %previous,
                    code = err.error_code(),
                    error = %err,
                    "Leave before rejoin failed, local state cleared anyway"
                );
            }
        }

        self.set_state(SessionState::Joining);

        match self.try_join(&request, pending.as_ref()).await {
            Ok(info) => {
                self.counters.record_join_succeeded();
                observability::record_join_attempt(true, started.elapsed());
                Ok(info)
            }
            Err(err) => {
                // Kept for a retry of the same join
                self.pending = pending;
                self.set_state(SessionState::Idle);
                self.counters.record_join_failed();
                observability::record_join_attempt(false, started.elapsed());
                Err(err)
            }
        }
    }

    async fn try_join(
        &mut self,
        request: &JoinRequest,
        pending: Option<&RoomInfo>,
    ) -> Result<RoomInfo, RoomError> {
        let entered = call_with_timeout(
            "enter_room",
            self.config.remote_call_timeout,
            self.services.directory.enter(request),
        )
        .await;
        observability::record_remote_call("enter_room", call_status(&entered));
        let context = entered?;

        self.services
            .realtime
            .set_parameters(context.as_ref(), &self.config.rtc_parameters());

        // Released on every early return below
        let playback = PlaybackLease::acquire(
            Arc::clone(&self.services.audio),
            request.room_id.clone(),
        );

        let cancel = self.cancel_token.child_token();
        self.coordinator
            .join_channels(Arc::clone(&context), request.role, &cancel)
            .await?;

        let metadata = match request.live_record_id {
            Some(live_record_id) => {
                let fetched = call_with_timeout(
                    "fetch_room_info",
                    self.config.remote_call_timeout,
                    self.services.directory.fetch_info(live_record_id),
                )
                .await;
                observability::record_remote_call("fetch_room_info", call_status(&fetched));

                match fetched {
                    Ok(info) => info,
                    Err(err) => {
                        warn!(
                            target: "room.controller",
                            room_id = %request.room_id,
                            live_record_id = %live_record_id,
                            code = err.error_code(),
                            error = %err,
                            "Room metadata fetch failed after join, rolling back"
                        );
                        self.coordinator.rollback(&context).await;
                        return Err(err);
                    }
                }
            }
            None => pending
                .cloned()
                .unwrap_or_else(|| RoomInfo::minimal(request.room_id.clone())),
        };

        let identity = RoomIdentity {
            room_id: request.room_id.clone(),
            live_record_id: metadata.live_record_id.or(request.live_record_id),
        };

        self.listeners.register(&context, &self.mailbox);
        self.session = Some(RoomSession::new(
            identity,
            context,
            metadata.clone(),
            playback,
        ));
        self.set_state(SessionState::Joined);
        observability::set_session_active(true);

        info!(
            target: "room.controller",
            room_id = %request.room_id,
            role = request.role.as_str(),
            "Room joined"
        );

        Ok(metadata)
    }

    async fn leave_room(&mut self, reason: CloseReason) -> Result<(), RoomError> {
        let context = match (&self.session, self.current_state()) {
            (Some(session), SessionState::Joined) => Arc::clone(session.context()),
            _ => return Err(RoomError::Precondition("Not in a room".to_string())),
        };

        self.set_state(SessionState::Leaving);

        let result =
            call_with_timeout("leave_room", self.config.leave_timeout, context.leave()).await;
        if let Err(err) = &result {
            observability::record_teardown_failure("leave_room");
            warn!(
                target: "room.controller",
                room_id = %context.room_id(),
                code = err.error_code(),
                error = %err,
                "Leave failed, clearing local state anyway"
            );
        }

        self.reset(reason);
        result
    }

    async fn end_room(&mut self, respond_to: oneshot::Sender<Result<(), RoomError>>) {
        let (identity, context) = match (&self.session, self.current_state()) {
            (Some(session), SessionState::Joined) => {
                (session.identity().clone(), Arc::clone(session.context()))
            }
            _ => {
                let _ = respond_to.send(Err(RoomError::Precondition(
                    "Not in a room".to_string(),
                )));
                return;
            }
        };

        let Some(live_record_id) = identity.live_record_id else {
            let _ = respond_to.send(Err(RoomError::MissingLiveRecordId(identity.room_id)));
            return;
        };

        self.set_state(SessionState::Ending);

        if let Err(err) =
            call_with_timeout("end_context", self.config.leave_timeout, context.end(true)).await
        {
            observability::record_teardown_failure("end_context");
            warn!(
                target: "room.controller",
                room_id = %identity.room_id,
                code = err.error_code(),
                error = %err,
                "Force end of room context failed"
            );
        }

        // Local teardown does not wait for the remote end
        self.reset(CloseReason::Ended);

        let directory = Arc::clone(&self.services.directory);
        let mailbox = self.mailbox.clone();
        let limit = self.config.end_timeout;
        tokio::spawn(async move {
            let result = call_with_timeout("end_room", limit, directory.end(live_record_id)).await;
            let completed = ControllerMessage::EndRoomCompleted {
                live_record_id,
                result,
                respond_to,
            };

            let undelivered = match mailbox.upgrade() {
                Some(sender) => sender.send(completed).await.err().map(|e| e.0),
                None => Some(completed),
            };

            // Controller stopped: answer the caller directly
            if let Some(ControllerMessage::EndRoomCompleted {
                result, respond_to, ..
            }) = undelivered
            {
                let _ = respond_to.send(result);
            }
        });
    }

    fn end_room_completed(&mut self, live_record_id: LiveRecordId, result: &Result<(), RoomError>) {
        observability::record_remote_call("end_room", call_status(result));

        match result {
            Ok(()) => {
                info!(
                    target: "room.controller",
                    live_record_id = %live_record_id,
                    "Room ended remotely"
                );
            }
            Err(err) => {
                error!(
                    target: "room.controller",
                    live_record_id = %live_record_id,
                    code = err.error_code(),
                    error = %err,
                    "Remote end request failed"
                );
            }
        }

        if self.current_state() == SessionState::Ending {
            self.set_state(SessionState::Idle);
        }
    }

    /// Idempotent teardown of local state.
    ///
    /// Unregisters listeners, forgets metadata from `create_room`, then drops
    /// the session, which releases audio playback. Leaves `Ending` in place
    /// for the pending remote end.
    fn reset(&mut self, reason: CloseReason) {
        self.listeners.unregister_all();
        self.pending = None;

        if let Some(session) = self.session.take() {
            let room_id = session.room_id().clone();
            drop(session);

            self.counters.record_teardown();
            observability::set_session_active(false);

            info!(
                target: "room.controller",
                room_id = %room_id,
                reason = ?reason,
                "Room session closed"
            );

            // No subscribers is fine
            let _ = self
                .notifications
                .send(RoomNotification::SessionClosed { room_id, reason });
        }

        if self.current_state() != SessionState::Ending {
            self.set_state(SessionState::Idle);
        }
    }

    fn handle_listener_event(&mut self, room_id: RoomId, event: ListenerEvent) {
        let is_live = self
            .session
            .as_ref()
            .is_some_and(|session| session.room_id() == &room_id);
        if !is_live {
            debug!(
                target: "room.controller",
                room_id = %room_id,
                "Dropping event for a room that is no longer joined"
            );
            return;
        }

        match event {
            ListenerEvent::Room(event) => {
                let remote_end = matches!(event, RoomEvent::RoomEnded { .. });
                let _ = self.notifications.send(RoomNotification::Room {
                    room_id: room_id.clone(),
                    event,
                });

                if remote_end {
                    info!(
                        target: "room.controller",
                        room_id = %room_id,
                        "Room ended by another participant"
                    );
                    self.reset(CloseReason::RemoteEnded);
                }
            }
            ListenerEvent::Seat(event) => {
                let _ = self
                    .notifications
                    .send(RoomNotification::Seat { room_id, event });
            }
        }
    }

    fn refresh_metadata(&mut self, info: RoomInfo) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let matches = info.live_record_id.is_some()
            && info.live_record_id == session.identity().live_record_id;
        if !matches {
            return;
        }

        debug!(
            target: "room.controller",
            room_id = %session.room_id(),
            audience_count = info.audience_count,
            "Session metadata refreshed"
        );
        session.set_metadata(info);
    }

    /// Leave a live session if there is one, then clear everything.
    async fn teardown(&mut self, reason: CloseReason) {
        if self.session.is_some() && self.current_state() == SessionState::Joined {
            if let Err(err) = self.leave_room(reason).await {
                debug!(
                    target: "room.controller",
                    code = err.error_code(),
                    "Leave during teardown failed"
                );
            }
        }
        self.reset(reason);
        self.set_state(SessionState::Idle);
    }

    fn status(&self) -> ControllerStatus {
        ControllerStatus {
            controller_id: self.config.controller_id.clone(),
            state: self.current_state(),
            room_id: self.session.as_ref().map(|s| s.room_id().clone()),
            joined_at: self.session.as_ref().map(RoomSession::joined_at),
            listener_count: self.listeners.len(),
            pending_room: self.pending.as_ref().map(|info| info.room_id.clone()),
            counters: self.counters.snapshot(),
            mailbox_depth: self.mailbox_monitor.current_depth(),
            mailbox_peak_depth: self.mailbox_monitor.peak_depth(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_call_status_labels() {
        assert_eq!(call_status::<()>(&Ok(())), "success");
        assert_eq!(
            call_status::<()>(&Err(RoomError::Timeout { operation: "end_room" })),
            "timeout"
        );
        assert_eq!(
            call_status::<()>(&Err(RoomError::Remote {
                code: 9,
                message: None
            })),
            "error"
        );
    }

    #[test]
    fn test_log_outcome_converts_errors() {
        let outcome: Outcome<()> =
            log_outcome("leave_room", Err(RoomError::Precondition("Not in a room".to_string())));
        assert_eq!(
            outcome.into_parts(),
            (-1, Some("Not in a room".to_string()), None)
        );
    }
}
