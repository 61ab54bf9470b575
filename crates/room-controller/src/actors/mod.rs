//! Controller actor and the components it owns.
//!
//! ```text
//! RoomSessionController (one per client)
//! ├── JoinCoordinator (two-channel join barrier, rollback)
//! ├── RoomSession (at most one; owns the PlaybackLease)
//! └── ListenerRegistry (room + seat listeners of the live session)
//! ```
//!
//! # Key Design Decisions
//!
//! - **Single control flow**: all state transitions run on the actor's message loop
//! - **Fan-out/fan-in joins**: both channel joins are spawned, then awaited together
//! - **Weak back-references**: listeners reach the actor through a `WeakSender` only
//! - **CancellationToken propagation**: each join runs under a child token of the controller
//!
//! # Modules
//!
//! - [`controller`] - `RoomSessionController` actor and its handle
//! - [`coordinator`] - `JoinCoordinator` join barrier
//! - [`messages`] - Message, state, and notification types
//! - [`metrics`] - Mailbox monitoring and session counters
//! - [`session`] - `RoomSession`, audio lease, listener registry

pub mod controller;
pub mod coordinator;
pub mod messages;
pub mod metrics;
pub mod session;

// Re-export primary types
pub use controller::{RoomSessionController, RoomSessionControllerHandle};
pub use coordinator::{aggregate, JoinCoordinator, JoinOutcome};
pub use messages::*;
pub use self::metrics::{MailboxLevel, MailboxMonitor, SessionCounters, SessionCountersSnapshot};
pub use session::{ListenerRegistry, PlaybackLease, RoomSession, SessionListener};
