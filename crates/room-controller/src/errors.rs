//! Room controller error types and the uniform outcome channel.
//!
//! Every public controller operation resolves with an [`Outcome`]: an integer
//! code (`0` is the only success value), an optional message, and a payload
//! that is present exactly when the code is `0`. Remote and channel codes are
//! passed through verbatim; failures synthesized locally use the fixed codes
//! below.

use crate::models::ChannelKind;
use common::types::RoomId;
use thiserror::Error;

/// Success sentinel shared by every collaborator and public operation.
pub const CODE_SUCCESS: i32 = 0;

/// Generic local failure (invalid state, missing identity field).
pub const CODE_FAILED: i32 = -1;

/// A channel join, leave, or remote call exceeded its configured timeout.
pub const CODE_TIMEOUT: i32 = -2;

/// A channel join was cancelled by `cancel()` or shutdown. Reported as the
/// channel's failure code, so it surfaces through `PartialJoinFailure`.
pub const CODE_CANCELLED: i32 = -3;

/// The controller could not process the request (mailbox closed, task failure).
pub const CODE_INTERNAL: i32 = -4;

/// Room controller error type.
///
/// Maps to outcome codes:
/// - `Precondition`, `MissingLiveRecordId`: `CODE_FAILED` (-1)
/// - `Remote`, `Channel`, `PartialJoinFailure`: the collaborator's code
/// - `Timeout`: `CODE_TIMEOUT` (-2)
/// - `Internal`: `CODE_INTERNAL` (-4)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Operation invoked in a state that does not allow it.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The live session has no live record, so it cannot be ended remotely.
    #[error("Live record id missing for room {0}")]
    MissingLiveRecordId(RoomId),

    /// A directory call returned a nonzero code.
    #[error("Remote error {code}: {}", message.as_deref().unwrap_or("<none>"))]
    Remote { code: i32, message: Option<String> },

    /// A channel join returned a nonzero code.
    #[error("{channel} channel error {code}: {}", message.as_deref().unwrap_or("<none>"))]
    Channel {
        channel: ChannelKind,
        code: i32,
        message: Option<String>,
    },

    /// A channel join failed and the room context was left again.
    #[error("Join rolled back after {channel} channel error {code}: {}", message.as_deref().unwrap_or("<none>"))]
    PartialJoinFailure {
        channel: ChannelKind,
        code: i32,
        message: Option<String>,
    },

    /// An operation exceeded its timeout.
    #[error("Timed out: {operation}")]
    Timeout { operation: &'static str },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// Returns the outcome code for this error.
    #[must_use]
    pub fn error_code(&self) -> i32 {
        match self {
            RoomError::Precondition(_) | RoomError::MissingLiveRecordId(_) => CODE_FAILED,
            RoomError::Remote { code, .. }
            | RoomError::Channel { code, .. }
            | RoomError::PartialJoinFailure { code, .. } => *code,
            RoomError::Timeout { .. } => CODE_TIMEOUT,
            RoomError::Internal(_) => CODE_INTERNAL,
        }
    }

    /// Returns the message reported to the caller.
    ///
    /// Collaborator messages pass through unchanged (including their absence);
    /// internal details are not exposed.
    #[must_use]
    pub fn client_message(&self) -> Option<String> {
        match self {
            RoomError::Precondition(msg) => Some(msg.clone()),
            RoomError::MissingLiveRecordId(_) => {
                Some("Failed to end room. Live record id does not exist.".to_string())
            }
            RoomError::Remote { message, .. }
            | RoomError::Channel { message, .. }
            | RoomError::PartialJoinFailure { message, .. } => message.clone(),
            RoomError::Timeout { operation } => Some(format!("{operation} timed out")),
            RoomError::Internal(_) => Some("An internal error occurred".to_string()),
        }
    }

    /// Marks a channel failure as rolled back.
    #[must_use]
    pub fn into_rolled_back(self) -> Self {
        match self {
            RoomError::Channel {
                channel,
                code,
                message,
            } => RoomError::PartialJoinFailure {
                channel,
                code,
                message,
            },
            other => other,
        }
    }
}

/// Result tuple returned by every public controller operation.
///
/// `code == 0` implies `payload.is_some()`, any other code implies
/// `payload.is_none()`. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    code: i32,
    message: Option<String>,
    payload: Option<T>,
}

impl<T> Outcome<T> {
    /// A successful outcome carrying `payload`.
    #[must_use]
    pub fn success(payload: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: None,
            payload: Some(payload),
        }
    }

    /// Outcome code; `0` on success.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Message accompanying a failure (or `None`).
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Payload of a successful outcome.
    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Whether the outcome reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// Consume the outcome, returning the payload of a success.
    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Split into the `(code, message, payload)` tuple.
    #[must_use]
    pub fn into_parts(self) -> (i32, Option<String>, Option<T>) {
        (self.code, self.message, self.payload)
    }
}

impl<T> From<RoomError> for Outcome<T> {
    fn from(err: RoomError) -> Self {
        let code = match err.error_code() {
            // A collaborator reporting failure with the success code is still a failure.
            CODE_SUCCESS => CODE_FAILED,
            code => code,
        };
        Self {
            code,
            message: err.client_message(),
            payload: None,
        }
    }
}

impl<T> From<Result<T, RoomError>> for Outcome<T> {
    fn from(result: Result<T, RoomError>) -> Self {
        match result {
            Ok(payload) => Outcome::success(payload),
            Err(err) => Outcome::from(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        // Local failures -> fixed codes
        assert_eq!(
            RoomError::Precondition("not joined".to_string()).error_code(),
            CODE_FAILED
        );
        assert_eq!(
            RoomError::MissingLiveRecordId(RoomId::new("r1")).error_code(),
            CODE_FAILED
        );
        assert_eq!(
            RoomError::Timeout { operation: "end_room" }.error_code(),
            CODE_TIMEOUT
        );
        assert_eq!(
            RoomError::Internal("mailbox closed".to_string()).error_code(),
            CODE_INTERNAL
        );

        // Collaborator codes pass through
        assert_eq!(
            RoomError::Remote {
                code: 404,
                message: None
            }
            .error_code(),
            404
        );
        assert_eq!(
            RoomError::Channel {
                channel: ChannelKind::Realtime,
                code: 101,
                message: Some("rtc-err".to_string()),
            }
            .error_code(),
            101
        );
    }

    #[test]
    fn test_client_messages_hide_internal_details() {
        let err = RoomError::Internal("response receive failed: channel closed".to_string());
        assert_eq!(
            err.client_message().as_deref(),
            Some("An internal error occurred")
        );
    }

    #[test]
    fn test_collaborator_message_passes_through_verbatim() {
        let err = RoomError::Channel {
            channel: ChannelKind::Event,
            code: 202,
            message: Some("chat-err".to_string()),
        };
        assert_eq!(err.client_message().as_deref(), Some("chat-err"));

        let silent = RoomError::Remote {
            code: 500,
            message: None,
        };
        assert_eq!(silent.client_message(), None);
    }

    #[test]
    fn test_into_rolled_back_keeps_code_and_message() {
        let err = RoomError::Channel {
            channel: ChannelKind::Event,
            code: 202,
            message: Some("chat-err".to_string()),
        }
        .into_rolled_back();

        assert_eq!(
            err,
            RoomError::PartialJoinFailure {
                channel: ChannelKind::Event,
                code: 202,
                message: Some("chat-err".to_string()),
            }
        );
        assert_eq!(err.error_code(), 202);
    }

    #[test]
    fn test_outcome_success_carries_payload() {
        let outcome = Outcome::success(7u32);
        assert!(outcome.is_success());
        assert_eq!(outcome.into_parts(), (0, None, Some(7)));
    }

    #[test]
    fn test_outcome_failure_never_carries_payload() {
        let outcome: Outcome<u32> = RoomError::Remote {
            code: 3,
            message: Some("gone".to_string()),
        }
        .into();
        assert!(!outcome.is_success());
        assert_eq!(outcome.into_parts(), (3, Some("gone".to_string()), None));
    }

    #[test]
    fn test_outcome_from_zero_coded_error_is_still_failure() {
        let outcome: Outcome<()> = RoomError::Remote {
            code: 0,
            message: Some("bogus".to_string()),
        }
        .into();
        assert_eq!(outcome.code(), CODE_FAILED);
        assert!(outcome.payload().is_none());
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!(
                "{}",
                RoomError::Channel {
                    channel: ChannelKind::Realtime,
                    code: 101,
                    message: Some("rtc-err".to_string()),
                }
            ),
            "realtime channel error 101: rtc-err"
        );
        assert_eq!(
            format!("{}", RoomError::Timeout { operation: "leave_room" }),
            "Timed out: leave_room"
        );
    }
}
