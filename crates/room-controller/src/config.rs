//! Room controller configuration.
//!
//! Configuration is loaded from environment variables. Every timeout bounds
//! one collaborator call; a call that exceeds it fails with `CODE_TIMEOUT`
//! and takes the same path as a reported failure.

use crate::models::RtcParameters;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default per-channel join timeout in milliseconds.
pub const DEFAULT_CHANNEL_JOIN_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for leaving a room context (explicit leave or rollback).
pub const DEFAULT_LEAVE_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for the remote end-room request.
pub const DEFAULT_END_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for other directory calls.
pub const DEFAULT_REMOTE_CALL_TIMEOUT_MS: u64 = 10_000;

/// Default controller mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Default notification broadcast buffer.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Default controller ID prefix.
pub const DEFAULT_CONTROLLER_ID_PREFIX: &str = "room";

/// Room controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Label used in logs.
    pub controller_id: String,

    /// Timeout for each channel join inside the join barrier.
    pub channel_join_timeout: Duration,

    /// Timeout for leaving (and force-ending) a room context.
    pub leave_timeout: Duration,

    /// Timeout for the remote end-room request.
    pub end_timeout: Duration,

    /// Timeout for create/fetch/list/enter directory calls.
    pub remote_call_timeout: Duration,

    /// Controller mailbox capacity.
    pub mailbox_capacity: usize,

    /// Notification broadcast buffer; slow subscribers lag past this.
    pub event_buffer: usize,

    /// Realtime channel flag: record audio.
    pub rtc_record_audio: bool,

    /// Realtime channel flag: record video.
    pub rtc_record_video: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller_id: generate_controller_id(),
            channel_join_timeout: Duration::from_millis(DEFAULT_CHANNEL_JOIN_TIMEOUT_MS),
            leave_timeout: Duration::from_millis(DEFAULT_LEAVE_TIMEOUT_MS),
            end_timeout: Duration::from_millis(DEFAULT_END_TIMEOUT_MS),
            remote_call_timeout: Duration::from_millis(DEFAULT_REMOTE_CALL_TIMEOUT_MS),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            event_buffer: DEFAULT_EVENT_BUFFER,
            rtc_record_audio: true,
            rtc_record_video: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let controller_id = vars
            .get("ROOM_CONTROLLER_ID")
            .cloned()
            .unwrap_or_else(generate_controller_id);

        let channel_join_timeout = parse_millis(
            vars,
            "ROOM_CHANNEL_JOIN_TIMEOUT_MS",
            DEFAULT_CHANNEL_JOIN_TIMEOUT_MS,
        )?;
        let leave_timeout = parse_millis(vars, "ROOM_LEAVE_TIMEOUT_MS", DEFAULT_LEAVE_TIMEOUT_MS)?;
        let end_timeout = parse_millis(vars, "ROOM_END_TIMEOUT_MS", DEFAULT_END_TIMEOUT_MS)?;
        let remote_call_timeout = parse_millis(
            vars,
            "ROOM_REMOTE_CALL_TIMEOUT_MS",
            DEFAULT_REMOTE_CALL_TIMEOUT_MS,
        )?;

        let mailbox_capacity =
            parse_positive(vars, "ROOM_MAILBOX_CAPACITY", DEFAULT_MAILBOX_CAPACITY)?;
        let event_buffer = parse_positive(vars, "ROOM_EVENT_BUFFER", DEFAULT_EVENT_BUFFER)?;

        let rtc_record_audio = parse_bool(vars, "ROOM_RTC_RECORD_AUDIO", true)?;
        let rtc_record_video = parse_bool(vars, "ROOM_RTC_RECORD_VIDEO", true)?;

        Ok(Config {
            controller_id,
            channel_join_timeout,
            leave_timeout,
            end_timeout,
            remote_call_timeout,
            mailbox_capacity,
            event_buffer,
            rtc_record_audio,
            rtc_record_video,
        })
    }

    /// Parameters applied to the realtime channel before joining.
    #[must_use]
    pub fn rtc_parameters(&self) -> RtcParameters {
        RtcParameters {
            record_audio: self.rtc_record_audio,
            record_video: self.rtc_record_video,
        }
    }
}

fn generate_controller_id() -> String {
    let uuid_suffix = uuid::Uuid::new_v4().to_string();
    let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
    format!("{DEFAULT_CONTROLLER_ID_PREFIX}-{short_suffix}")
}

fn parse_millis(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    parse_positive(vars, key, default).map(Duration::from_millis)
}

fn parse_positive<T>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match vars.get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value != T::default() => Ok(value),
            Ok(_) => Err(ConfigError::InvalidValue(format!("{key} must be positive"))),
            Err(_) => Err(ConfigError::InvalidValue(format!(
                "{key} is not a valid number: {raw}"
            ))),
        },
    }
}

fn parse_bool(vars: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match vars.get(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(format!(
                "{key} is not a valid boolean: {raw}"
            ))),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load successfully");

        assert_eq!(
            config.channel_join_timeout,
            Duration::from_millis(DEFAULT_CHANNEL_JOIN_TIMEOUT_MS)
        );
        assert_eq!(
            config.leave_timeout,
            Duration::from_millis(DEFAULT_LEAVE_TIMEOUT_MS)
        );
        assert_eq!(config.end_timeout, Duration::from_millis(DEFAULT_END_TIMEOUT_MS));
        assert_eq!(
            config.remote_call_timeout,
            Duration::from_millis(DEFAULT_REMOTE_CALL_TIMEOUT_MS)
        );
        assert_eq!(config.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
        assert!(config.rtc_record_audio);
        assert!(config.rtc_record_video);
        // Controller ID should be auto-generated
        assert!(config.controller_id.starts_with("room-"));
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let vars = HashMap::from([
            ("ROOM_CONTROLLER_ID".to_string(), "room-custom".to_string()),
            ("ROOM_CHANNEL_JOIN_TIMEOUT_MS".to_string(), "2500".to_string()),
            ("ROOM_LEAVE_TIMEOUT_MS".to_string(), "800".to_string()),
            ("ROOM_END_TIMEOUT_MS".to_string(), "3000".to_string()),
            ("ROOM_REMOTE_CALL_TIMEOUT_MS".to_string(), "1500".to_string()),
            ("ROOM_MAILBOX_CAPACITY".to_string(), "16".to_string()),
            ("ROOM_EVENT_BUFFER".to_string(), "32".to_string()),
            ("ROOM_RTC_RECORD_AUDIO".to_string(), "false".to_string()),
            ("ROOM_RTC_RECORD_VIDEO".to_string(), "0".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.controller_id, "room-custom");
        assert_eq!(config.channel_join_timeout, Duration::from_millis(2500));
        assert_eq!(config.leave_timeout, Duration::from_millis(800));
        assert_eq!(config.end_timeout, Duration::from_millis(3000));
        assert_eq!(config.remote_call_timeout, Duration::from_millis(1500));
        assert_eq!(config.mailbox_capacity, 16);
        assert_eq!(config.event_buffer, 32);
        assert_eq!(
            config.rtc_parameters(),
            RtcParameters {
                record_audio: false,
                record_video: false
            }
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let vars = HashMap::from([("ROOM_CHANNEL_JOIN_TIMEOUT_MS".to_string(), "0".to_string())]);
        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidValue(msg)) if msg.contains("ROOM_CHANNEL_JOIN_TIMEOUT_MS"))
        );
    }

    #[test]
    fn test_unparsable_capacity_rejected() {
        let vars = HashMap::from([("ROOM_MAILBOX_CAPACITY".to_string(), "lots".to_string())]);
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let vars = HashMap::from([("ROOM_RTC_RECORD_AUDIO".to_string(), "maybe".to_string())]);
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
