//! Collaborator interfaces consumed by the controller.
//!
//! The controller never talks to a transport or the directory directly; it is
//! handed a [`RoomServices`] bundle at construction. Every trait here has a
//! mock in `room-test-utils`.
//!
//! # Modules
//!
//! - [`directory`] - room directory (create, metadata, listing, end, enter)
//! - [`context`] - room context handle and the listeners registered on it
//! - [`channels`] - realtime and event channel joins
//! - [`audio`] - audio playback resource held for the life of a session

pub mod audio;
pub mod channels;
pub mod context;
pub mod directory;

pub use audio::AudioPlayback;
pub use channels::{EventChannel, RealtimeChannel};
pub use context::{
    RoomContext, RoomEvent, RoomEventListener, SeatEvent, SeatEventListener, SeatItem,
    SeatStatus,
};
pub use directory::RoomDirectory;

use crate::errors::{RoomError, CODE_FAILED, CODE_SUCCESS};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a collaborator: `(code, message)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service error {code}: {}", message.as_deref().unwrap_or("<none>"))]
pub struct ServiceError {
    pub code: i32,
    pub message: Option<String>,
}

impl ServiceError {
    /// Create a service error.
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// The code to report; a collaborator failing with `0` is coerced to a failure code.
    #[must_use]
    pub fn failure_code(&self) -> i32 {
        if self.code == CODE_SUCCESS {
            CODE_FAILED
        } else {
            self.code
        }
    }
}

impl From<ServiceError> for RoomError {
    fn from(err: ServiceError) -> Self {
        RoomError::Remote {
            code: err.failure_code(),
            message: err.message,
        }
    }
}

/// Collaborators handed to the controller at construction.
#[derive(Clone)]
pub struct RoomServices {
    pub directory: Arc<dyn RoomDirectory>,
    pub realtime: Arc<dyn RealtimeChannel>,
    pub event: Arc<dyn EventChannel>,
    pub audio: Arc<dyn AudioPlayback>,
}

/// Await a collaborator call, bounding it by `limit`.
pub(crate) async fn call_with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, RoomError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(RoomError::from),
        Err(_) => Err(RoomError::Timeout { operation }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_maps_to_remote() {
        let err: RoomError = ServiceError::new(404, "no such room").into();
        assert_eq!(
            err,
            RoomError::Remote {
                code: 404,
                message: Some("no such room".to_string())
            }
        );
    }

    #[test]
    fn test_zero_code_service_error_is_coerced() {
        let err = ServiceError {
            code: 0,
            message: None,
        };
        assert_eq!(err.failure_code(), CODE_FAILED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_with_timeout_elapses() {
        let result: Result<(), RoomError> = call_with_timeout(
            "fetch_info",
            Duration::from_millis(50),
            std::future::pending::<Result<(), ServiceError>>(),
        )
        .await;
        assert_eq!(result, Err(RoomError::Timeout { operation: "fetch_info" }));
    }

    #[tokio::test]
    async fn test_call_with_timeout_passes_result_through() {
        let result = call_with_timeout("fetch_info", Duration::from_secs(1), async {
            Ok::<_, ServiceError>(5)
        })
        .await;
        assert_eq!(result, Ok(5));
    }
}
