//! Room directory: request/response operations on remote rooms.

use super::context::RoomContext;
use super::ServiceError;
use crate::models::{CreateRoomDefaults, CreateRoomParams, JoinRequest, LiveState, RoomInfo, RoomList};
use async_trait::async_trait;
use common::types::LiveRecordId;
use std::sync::Arc;

/// Remote room directory.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Create a room. Does not enter it.
    async fn create(&self, params: &CreateRoomParams) -> Result<RoomInfo, ServiceError>;

    /// Fetch metadata for a live record.
    async fn fetch_info(&self, live_record_id: LiveRecordId) -> Result<RoomInfo, ServiceError>;

    /// Fetch the defaults suggested for a new room.
    async fn fetch_defaults(&self) -> Result<CreateRoomDefaults, ServiceError>;

    /// List rooms in `state`, one page at a time (pages start at 1).
    async fn list_rooms(
        &self,
        state: LiveState,
        page_num: u32,
        page_size: u32,
    ) -> Result<RoomList, ServiceError>;

    /// Record the live record as ended.
    async fn end(&self, live_record_id: LiveRecordId) -> Result<(), ServiceError>;

    /// Enter a room, returning a context whose channels are not yet joined.
    async fn enter(&self, request: &JoinRequest) -> Result<Arc<dyn RoomContext>, ServiceError>;
}
