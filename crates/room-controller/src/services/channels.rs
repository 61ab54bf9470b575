//! Realtime (media) and event (chatroom) channel clients.
//!
//! Both joins complete asynchronously with a `(code, message)` result; the
//! controller runs them concurrently and never retries them.
//!
//! The controller leaves a room through [`RoomContext::leave`], which
//! releases both channels. The per-channel `leave` calls are for embedders
//! that drive a single channel on their own.

use super::context::RoomContext;
use super::ServiceError;
use crate::models::{Role, RtcParameters};
use async_trait::async_trait;

/// Real-time media transport.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Join the media channel of `context` with `role`.
    async fn join(&self, context: &dyn RoomContext, role: Role) -> Result<(), ServiceError>;

    /// Leave the media channel of `context`.
    async fn leave(&self, context: &dyn RoomContext) -> Result<(), ServiceError>;

    /// Apply channel parameters before joining.
    fn set_parameters(&self, context: &dyn RoomContext, parameters: &RtcParameters);
}

/// Text/event transport.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Join the chatroom of `context`.
    async fn join_chatroom(&self, context: &dyn RoomContext) -> Result<(), ServiceError>;

    /// Leave the chatroom of `context`.
    async fn leave(&self, context: &dyn RoomContext) -> Result<(), ServiceError>;
}
