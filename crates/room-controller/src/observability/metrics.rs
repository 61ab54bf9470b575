//! Metric recording functions.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a finished join attempt.
///
/// Metrics: `room_join_attempts_total`, `room_join_duration_seconds`
/// Labels: `result` (success, failure)
pub fn record_join_attempt(success: bool, duration: Duration) {
    let result = if success { "success" } else { "failure" };
    counter!("room_join_attempts_total", "result" => result).increment(1);
    histogram!("room_join_duration_seconds", "result" => result).record(duration.as_secs_f64());
}

/// Record a failed channel join.
///
/// Metric: `room_channel_join_failures_total`
/// Labels: `channel` (realtime, event), `kind` (error, timeout, cancelled, task_failed)
pub fn record_channel_join_failure(channel: &'static str, kind: &'static str) {
    counter!("room_channel_join_failures_total", "channel" => channel, "kind" => kind)
        .increment(1);
}

/// Record a rollback of a partially joined context.
///
/// Metric: `room_join_rollbacks_total`
pub fn record_rollback() {
    counter!("room_join_rollbacks_total").increment(1);
}

/// Record a cleanup step that failed; cleanup failures never change an outcome.
///
/// Metric: `room_teardown_failures_total`
/// Labels: `operation` (leave_room, force_end, rollback_leave)
pub fn record_teardown_failure(operation: &'static str) {
    counter!("room_teardown_failures_total", "operation" => operation).increment(1);
}

/// Record a directory call.
///
/// Metric: `room_remote_calls_total`
/// Labels: `operation`, `status` (success, error, timeout)
pub fn record_remote_call(operation: &'static str, status: &'static str) {
    counter!("room_remote_calls_total", "operation" => operation, "status" => status).increment(1);
}

/// Set whether a session is live.
///
/// Metric: `room_session_active`
pub fn set_session_active(active: bool) {
    gauge!("room_session_active").set(if active { 1.0 } else { 0.0 });
}

/// Set the controller mailbox backlog.
///
/// Metric: `room_mailbox_depth`
pub fn set_mailbox_depth(depth: usize) {
    // usize to f64 conversion is safe for realistic mailbox sizes (< 2^53)
    #[allow(clippy::cast_precision_loss)]
    gauge!("room_mailbox_depth").set(depth as f64);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_join_attempt(true, Duration::from_millis(20));
        record_channel_join_failure("realtime", "timeout");
        record_rollback();
        record_teardown_failure("leave_room");
        record_remote_call("fetch_info", "success");
        set_session_active(true);
        set_mailbox_depth(3);
    }

    #[test]
    fn test_join_metrics_are_emitted() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_join_attempt(false, Duration::from_millis(40));
            record_channel_join_failure("event", "error");
            record_rollback();
            set_session_active(false);
        });

        let metrics = snapshotter.snapshot().into_vec();
        let names: Vec<String> = metrics
            .iter()
            .map(|(key, _, _, _)| key.key().name().to_string())
            .collect();

        assert!(names.contains(&"room_join_attempts_total".to_string()));
        assert!(names.contains(&"room_join_duration_seconds".to_string()));
        assert!(names.contains(&"room_channel_join_failures_total".to_string()));
        assert!(names.contains(&"room_join_rollbacks_total".to_string()));

        let rollbacks = metrics
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "room_join_rollbacks_total")
            .map(|(_, _, _, value)| value.clone());
        assert_eq!(rollbacks, Some(&DebugValue::Counter(1)));
    }
}
