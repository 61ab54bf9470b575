//! Two-channel join barrier.
//!
//! Both channel joins are spawned before either is awaited, and the
//! coordinator waits for both before deciding. Any failure leaves the room
//! context again before the outcome is returned, so a half-joined context is
//! never observable.
//!
//! When both channels fail, the realtime failure is reported.

use super::metrics::SessionCounters;
use crate::errors::{RoomError, CODE_CANCELLED, CODE_INTERNAL, CODE_TIMEOUT};
use crate::models::{ChannelJoinResult, ChannelKind, Role};
use crate::observability;
use crate::services::{call_with_timeout, EventChannel, RealtimeChannel, RoomContext, ServiceError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Aggregated result of one join attempt.
pub type JoinOutcome = Result<(), RoomError>;

/// Runs the join barrier over the realtime and event channels.
pub struct JoinCoordinator {
    realtime: Arc<dyn RealtimeChannel>,
    event: Arc<dyn EventChannel>,
    /// Bound on each channel join.
    join_timeout: Duration,
    /// Bound on the rollback leave.
    leave_timeout: Duration,
    counters: Arc<SessionCounters>,
}

impl JoinCoordinator {
    pub fn new(
        realtime: Arc<dyn RealtimeChannel>,
        event: Arc<dyn EventChannel>,
        join_timeout: Duration,
        leave_timeout: Duration,
        counters: Arc<SessionCounters>,
    ) -> Self {
        Self {
            realtime,
            event,
            join_timeout,
            leave_timeout,
            counters,
        }
    }

    /// Join both channels of `context`.
    ///
    /// Resolves only after both joins completed, timed out, or were
    /// cancelled through `cancel`. On failure the context has been left.
    #[instrument(
        skip_all,
        name = "room.coordinator.join",
        fields(room_id = %context.room_id(), role = role.as_str())
    )]
    pub async fn join_channels(
        &self,
        context: Arc<dyn RoomContext>,
        role: Role,
        cancel: &CancellationToken,
    ) -> JoinOutcome {
        let realtime_task = {
            let channel = Arc::clone(&self.realtime);
            let context = Arc::clone(&context);
            let cancel = cancel.clone();
            let limit = self.join_timeout;
            tokio::spawn(async move {
                guarded_join(
                    ChannelKind::Realtime,
                    limit,
                    cancel,
                    channel.join(context.as_ref(), role),
                )
                .await
            })
        };

        let event_task = {
            let channel = Arc::clone(&self.event);
            let context = Arc::clone(&context);
            let cancel = cancel.clone();
            let limit = self.join_timeout;
            tokio::spawn(async move {
                guarded_join(
                    ChannelKind::Event,
                    limit,
                    cancel,
                    channel.join_chatroom(context.as_ref()),
                )
                .await
            })
        };

        let (realtime, event) = tokio::join!(realtime_task, event_task);
        let realtime = task_result(ChannelKind::Realtime, realtime);
        let event = task_result(ChannelKind::Event, event);

        debug!(
            target: "room.coordinator",
            realtime_code = realtime.code,
            event_code = event.code,
            "Join barrier released"
        );

        match aggregate(&realtime, &event) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    target: "room.coordinator",
                    room_id = %context.room_id(),
                    code = err.error_code(),
                    error = %err,
                    "Channel join failed, rolling back"
                );
                self.rollback(&context).await;
                Err(err.into_rolled_back())
            }
        }
    }

    /// Leave `context` after a failed join attempt.
    ///
    /// Best-effort: a failing leave is logged and never replaces the
    /// outcome already decided by the caller.
    pub async fn rollback(&self, context: &Arc<dyn RoomContext>) {
        self.counters.record_rollback();
        observability::record_rollback();

        match call_with_timeout("rollback_leave", self.leave_timeout, context.leave()).await {
            Ok(()) => {
                info!(
                    target: "room.coordinator",
                    room_id = %context.room_id(),
                    "Room context left after failed join"
                );
            }
            Err(err) => {
                observability::record_teardown_failure("rollback_leave");
                warn!(
                    target: "room.coordinator",
                    room_id = %context.room_id(),
                    code = err.error_code(),
                    error = %err,
                    "Rollback leave failed"
                );
            }
        }
    }
}

/// Combine both channel results. Realtime failure takes priority.
pub fn aggregate(realtime: &ChannelJoinResult, event: &ChannelJoinResult) -> JoinOutcome {
    for result in [realtime, event] {
        if !result.is_success() {
            return Err(RoomError::Channel {
                channel: result.channel,
                code: result.code,
                message: result.message.clone(),
            });
        }
    }
    Ok(())
}

async fn guarded_join<F>(
    channel: ChannelKind,
    limit: Duration,
    cancel: CancellationToken,
    join: F,
) -> ChannelJoinResult
where
    F: Future<Output = Result<(), ServiceError>>,
{
    let (result, kind) = tokio::select! {
        () = cancel.cancelled() => (
            ChannelJoinResult::failed(
                channel,
                CODE_CANCELLED,
                Some(format!("{channel} channel join cancelled")),
            ),
            "cancelled",
        ),
        outcome = tokio::time::timeout(limit, join) => match outcome {
            Ok(Ok(())) => (ChannelJoinResult::succeeded(channel), "none"),
            Ok(Err(err)) => (
                ChannelJoinResult::failed(channel, err.failure_code(), err.message),
                "error",
            ),
            Err(_) => (
                ChannelJoinResult::failed(
                    channel,
                    CODE_TIMEOUT,
                    Some(format!("{channel} channel join timed out")),
                ),
                "timeout",
            ),
        },
    };

    if !result.is_success() {
        observability::record_channel_join_failure(channel.as_str(), kind);
        debug!(
            target: "room.coordinator",
            channel = %channel,
            code = result.code,
            kind,
            "Channel join did not succeed"
        );
    }

    result
}

fn task_result(
    channel: ChannelKind,
    joined: Result<ChannelJoinResult, JoinError>,
) -> ChannelJoinResult {
    joined.unwrap_or_else(|e| {
        warn!(
            target: "room.coordinator",
            channel = %channel,
            error = %e,
            "Channel join task failed"
        );
        observability::record_channel_join_failure(channel.as_str(), "task_failed");
        ChannelJoinResult::failed(
            channel,
            CODE_INTERNAL,
            Some(format!("{channel} channel join task failed")),
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn failed(channel: ChannelKind, code: i32, message: &str) -> ChannelJoinResult {
        ChannelJoinResult::failed(channel, code, Some(message.to_string()))
    }

    #[test]
    fn test_aggregate_both_succeed() {
        let outcome = aggregate(
            &ChannelJoinResult::succeeded(ChannelKind::Realtime),
            &ChannelJoinResult::succeeded(ChannelKind::Event),
        );
        assert_eq!(outcome, Ok(()));
    }

    #[test]
    fn test_aggregate_realtime_wins_tie_break() {
        let outcome = aggregate(
            &failed(ChannelKind::Realtime, 101, "rtc-err"),
            &failed(ChannelKind::Event, 202, "chat-err"),
        );
        assert_eq!(
            outcome,
            Err(RoomError::Channel {
                channel: ChannelKind::Realtime,
                code: 101,
                message: Some("rtc-err".to_string()),
            })
        );
    }

    #[test]
    fn test_aggregate_single_failure_reported() {
        let outcome = aggregate(
            &ChannelJoinResult::succeeded(ChannelKind::Realtime),
            &failed(ChannelKind::Event, 202, "chat-err"),
        );
        assert_eq!(outcome.unwrap_err().error_code(), 202);

        let outcome = aggregate(
            &failed(ChannelKind::Realtime, 101, "rtc-err"),
            &ChannelJoinResult::succeeded(ChannelKind::Event),
        );
        assert_eq!(outcome.unwrap_err().client_message().as_deref(), Some("rtc-err"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_join_times_out() {
        let result = guarded_join(
            ChannelKind::Event,
            Duration::from_secs(2),
            CancellationToken::new(),
            std::future::pending::<Result<(), ServiceError>>(),
        )
        .await;
        assert_eq!(result.code, CODE_TIMEOUT);
        assert_eq!(result.channel, ChannelKind::Event);
    }

    #[tokio::test]
    async fn test_guarded_join_observes_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = guarded_join(
            ChannelKind::Realtime,
            Duration::from_secs(60),
            cancel,
            std::future::pending::<Result<(), ServiceError>>(),
        )
        .await;
        assert_eq!(result.code, CODE_CANCELLED);
    }

    #[tokio::test]
    async fn test_guarded_join_passes_channel_code_through() {
        let result = guarded_join(
            ChannelKind::Realtime,
            Duration::from_secs(60),
            CancellationToken::new(),
            async { Err(ServiceError::new(101, "rtc-err")) },
        )
        .await;
        assert_eq!(
            result,
            ChannelJoinResult::failed(ChannelKind::Realtime, 101, Some("rtc-err".to_string()))
        );
    }
}
