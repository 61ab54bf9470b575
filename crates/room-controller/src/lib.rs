//! Room Session Controller Library
//!
//! Client-side controller for entering, leaving, and managing a multi-party
//! room backed by two independently operated transports: a realtime media
//! channel and a text/event channel.
//!
//! - Atomic two-channel join with rollback on any partial failure
//! - At most one live room session per controller
//! - Serialized joins: a new room is joined only after the previous one is torn down
//! - Uniform `(code, message, payload)` outcomes for every operation
//!
//! # Architecture
//!
//! ```text
//! RoomSessionControllerHandle (cloneable, async API)
//! └── RoomSessionController actor (mpsc mailbox)
//!     ├── JoinCoordinator ── RealtimeChannel / EventChannel
//!     ├── RoomSession ────── RoomContext, AudioPlayback
//!     └── RoomDirectory (create, enter, fetch, list, end)
//! ```
//!
//! # Modules
//!
//! - [`actors`] - Controller actor, join coordinator, session bookkeeping
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error taxonomy and the `Outcome` result type
//! - [`models`] - Plain data records
//! - [`observability`] - Metrics emission
//! - [`services`] - Collaborator traits

pub mod actors;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod services;

pub use actors::{
    CloseReason, ControllerStatus, RoomNotification, RoomSessionControllerHandle, SessionState,
};
pub use config::Config;
pub use errors::{Outcome, RoomError};
pub use models::{JoinRequest, Role, RoomInfo};
pub use services::{RoomServices, ServiceError};
