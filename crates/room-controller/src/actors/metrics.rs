//! Controller counters and mailbox monitoring.
//!
//! Mailbox depth thresholds for the controller:
//!
//! | Normal | Warning | Critical |
//! |--------|---------|----------|
//! | < 8    | 8-32    | > 32     |

use crate::observability;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Mailbox depth above which the backlog is logged at debug level.
pub const MAILBOX_NORMAL: usize = 8;

/// Mailbox depth above which the backlog is logged as a warning.
pub const MAILBOX_WARNING: usize = 32;

/// Mailbox depth level for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxLevel {
    /// Below normal threshold.
    Normal,
    /// Between normal and warning thresholds.
    Warning,
    /// Above warning threshold.
    Critical,
}

/// Tracks the controller mailbox backlog as observed by senders.
#[derive(Debug)]
pub struct MailboxMonitor {
    /// Controller identifier for labeling.
    controller_id: String,
    /// Last observed depth.
    depth: AtomicUsize,
    /// Peak depth since last reset.
    peak_depth: AtomicUsize,
}

impl MailboxMonitor {
    /// Create a new mailbox monitor for the given controller.
    #[must_use]
    pub fn new(controller_id: impl Into<String>) -> Self {
        Self {
            controller_id: controller_id.into(),
            depth: AtomicUsize::new(0),
            peak_depth: AtomicUsize::new(0),
        }
    }

    /// Record the depth observed right after enqueueing a message.
    pub fn observe(&self, depth: usize) {
        self.depth.store(depth, Ordering::Relaxed);
        self.peak_depth.fetch_max(depth, Ordering::Relaxed);
        observability::set_mailbox_depth(depth);

        match Self::level_for_depth(depth) {
            MailboxLevel::Critical => {
                warn!(
                    target: "room.mailbox",
                    controller_id = %self.controller_id,
                    depth,
                    threshold = MAILBOX_WARNING,
                    "Mailbox depth critical"
                );
            }
            // Log once when crossing the normal threshold
            MailboxLevel::Warning if depth == MAILBOX_NORMAL + 1 => {
                debug!(
                    target: "room.mailbox",
                    controller_id = %self.controller_id,
                    depth,
                    "Mailbox depth elevated"
                );
            }
            _ => {}
        }
    }

    /// Get the last observed mailbox depth.
    #[must_use]
    pub fn current_depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Get the peak mailbox depth.
    #[must_use]
    pub fn peak_depth(&self) -> usize {
        self.peak_depth.load(Ordering::Relaxed)
    }

    /// Get the current mailbox level.
    #[must_use]
    pub fn current_level(&self) -> MailboxLevel {
        Self::level_for_depth(self.current_depth())
    }

    /// Determine mailbox level for a given depth.
    fn level_for_depth(depth: usize) -> MailboxLevel {
        if depth > MAILBOX_WARNING {
            MailboxLevel::Critical
        } else if depth > MAILBOX_NORMAL {
            MailboxLevel::Warning
        } else {
            MailboxLevel::Normal
        }
    }
}

/// Lifetime counters of one controller.
///
/// Shared between the controller actor and its join coordinator.
/// All fields are atomic for lock-free concurrent access.
#[derive(Debug, Default)]
pub struct SessionCounters {
    join_attempts: AtomicU64,
    joins_succeeded: AtomicU64,
    joins_failed: AtomicU64,
    rollbacks: AtomicU64,
    teardowns: AtomicU64,
    messages_processed: AtomicU64,
}

/// Snapshot of controller counters at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCountersSnapshot {
    pub join_attempts: u64,
    pub joins_succeeded: u64,
    pub joins_failed: u64,
    pub rollbacks: u64,
    pub teardowns: u64,
    pub messages_processed: u64,
}

impl SessionCounters {
    /// Create a new shared counters instance.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_join_attempt(&self) {
        self.join_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_join_succeeded(&self) {
        self.joins_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_join_failed(&self) {
        self.joins_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// A live session was torn down (leave, end, remote end, or reset).
    pub fn record_teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> SessionCountersSnapshot {
        SessionCountersSnapshot {
            join_attempts: self.join_attempts.load(Ordering::Relaxed),
            joins_succeeded: self.joins_succeeded.load(Ordering::Relaxed),
            joins_failed: self.joins_failed.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_monitor_tracks_peak() {
        let monitor = MailboxMonitor::new("room-test");
        monitor.observe(3);
        monitor.observe(12);
        monitor.observe(1);

        assert_eq!(monitor.current_depth(), 1);
        assert_eq!(monitor.peak_depth(), 12);
    }

    #[test]
    fn test_mailbox_levels() {
        let monitor = MailboxMonitor::new("room-test");

        monitor.observe(MAILBOX_NORMAL);
        assert_eq!(monitor.current_level(), MailboxLevel::Normal);

        monitor.observe(MAILBOX_NORMAL + 1);
        assert_eq!(monitor.current_level(), MailboxLevel::Warning);

        monitor.observe(MAILBOX_WARNING + 1);
        assert_eq!(monitor.current_level(), MailboxLevel::Critical);
    }

    #[test]
    fn test_session_counters_snapshot() {
        let counters = SessionCounters::new();
        counters.record_join_attempt();
        counters.record_join_attempt();
        counters.record_join_succeeded();
        counters.record_join_failed();
        counters.record_rollback();
        counters.record_teardown();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.join_attempts, 2);
        assert_eq!(snapshot.joins_succeeded, 1);
        assert_eq!(snapshot.joins_failed, 1);
        assert_eq!(snapshot.rollbacks, 1);
        assert_eq!(snapshot.teardowns, 1);
        assert_eq!(snapshot.messages_processed, 0);
    }
}
