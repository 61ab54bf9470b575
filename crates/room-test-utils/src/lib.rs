//! # Room Test Utilities
//!
//! Mocks and fixtures for testing the room session controller without real
//! transports or a room directory.
//!
//! ## Modules
//!
//! - `call_log` - Shared ordered record of collaborator calls
//! - `script` - Scripted completions (result, delay, never)
//! - `mock_directory` - Mock room directory handing out mock contexts
//! - `mock_context` - Mock room context with listener bookkeeping
//! - `mock_channels` - Mock realtime and event channels
//! - `mock_audio` - Mock audio playback
//! - `fixtures` - Pre-configured test data and `TestHarness`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use room_test_utils::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_example() {
//!     let harness = TestHarness::new();
//!     harness.event.push(Scripted::failure(202, "chat-err"));
//!
//!     let controller = harness.spawn();
//!     let outcome = controller.join_room(audience_request("R1")).await;
//!
//!     assert_eq!(outcome.code(), 202);
//!     assert_eq!(harness.log.count(&Call::Leave(RoomId::new("R1"))), 1);
//! }
//! ```

pub mod call_log;
pub mod fixtures;
pub mod mock_audio;
pub mod mock_channels;
pub mod mock_context;
pub mod mock_directory;
pub mod script;

// Re-export commonly used items
pub use call_log::*;
pub use fixtures::*;
pub use mock_audio::*;
pub use mock_channels::*;
pub use mock_context::*;
pub use mock_directory::*;
pub use script::*;

/// Install a test subscriber honoring `RUST_LOG` (default `room=debug`).
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("room=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
