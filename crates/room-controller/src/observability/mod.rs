//! Observability for the room controller.
//!
//! Metrics go through the `metrics` facade; the embedding application
//! installs whichever recorder it exports with. Labels are bounded:
//! - `result`: success, failure
//! - `channel`: realtime, event
//! - `kind`: error, timeout, cancelled
//! - `operation`: bounded by the directory and context calls (~8 values)
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `room_join_attempts_total` | Counter | `result` | Join attempts by aggregated result |
//! | `room_join_duration_seconds` | Histogram | `result` | Time from request to outcome |
//! | `room_channel_join_failures_total` | Counter | `channel`, `kind` | Failed channel joins |
//! | `room_join_rollbacks_total` | Counter | none | Contexts left after a failed join |
//! | `room_teardown_failures_total` | Counter | `operation` | Best-effort cleanup failures |
//! | `room_remote_calls_total` | Counter | `operation`, `status` | Directory calls |
//! | `room_session_active` | Gauge | none | 1 while a session is live |
//! | `room_mailbox_depth` | Gauge | none | Controller backlog |

pub mod metrics;

pub use self::metrics::{
    record_channel_join_failure, record_join_attempt, record_remote_call, record_rollback,
    record_teardown_failure, set_mailbox_depth, set_session_active,
};
