//! Integration tests for the read-only directory queries on the handle.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::types::{LiveRecordId, RoomId};
use room_controller::errors::CODE_TIMEOUT;
use room_controller::models::{LiveState, RoomInfo};
use room_controller::SessionState;
use room_test_utils::*;

fn seeded_harness() -> TestHarness {
    let harness = TestHarness::new();
    for (room_id, live_record_id) in [("A", 1), ("B", 2), ("C", 3)] {
        harness.directory.add_room(room_info(room_id, live_record_id));
    }
    harness
}

#[tokio::test(start_paused = true)]
async fn test_list_rooms_paginates_live_rooms() {
    let harness = seeded_harness();
    let controller = harness.spawn();

    let first = controller
        .list_rooms(LiveState::Live, 1, 2)
        .await
        .into_payload()
        .unwrap();
    let second = controller
        .list_rooms(LiveState::Live, 2, 2)
        .await
        .into_payload()
        .unwrap();

    assert_eq!(first.page_num, 1);
    assert!(first.has_next_page);
    assert_eq!(
        first.rooms.iter().map(|r| r.room_id.clone()).collect::<Vec<_>>(),
        vec![RoomId::new("A"), RoomId::new("B")]
    );
    assert!(!second.has_next_page);
    assert_eq!(second.rooms.len(), 1);
    assert_eq!(
        harness.log.calls(),
        vec![
            Call::ListRooms {
                page_num: 1,
                page_size: 2
            },
            Call::ListRooms {
                page_num: 2,
                page_size: 2
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_list_rooms_remote_error_passes_through() {
    let harness = seeded_harness();
    let controller = harness.spawn();

    let outcome = controller.list_rooms(LiveState::Live, 0, 2).await;

    assert_eq!(outcome.code(), 400);
    assert!(outcome.payload().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_room_info_for_known_and_unknown_records() {
    let harness = seeded_harness();
    let controller = harness.spawn();

    let known = controller.room_info(LiveRecordId(2)).await;
    assert_eq!(known.into_payload(), Some(room_info("B", 2)));

    let unknown = controller.room_info(LiveRecordId(99)).await;
    assert_eq!(
        unknown.into_parts(),
        (ROOM_NOT_FOUND, Some("room not found".to_string()), None)
    );
}

#[tokio::test(start_paused = true)]
async fn test_room_info_times_out() {
    let harness = seeded_harness();
    harness.directory.script_fetch_info(Scripted::never());
    let controller = harness.spawn();

    let outcome = controller.room_info(LiveRecordId(1)).await;

    assert_eq!(outcome.code(), CODE_TIMEOUT);
    assert!(outcome.payload().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_create_room_defaults() {
    let harness = TestHarness::new();
    let controller = harness.spawn();

    let defaults = controller
        .create_room_defaults()
        .await
        .into_payload()
        .unwrap();

    assert_eq!(defaults.topic, "Evening chat");
    assert_eq!(defaults.default_covers.len(), 2);
    assert!(harness.log.contains(&Call::FetchDefaults));
}

#[tokio::test(start_paused = true)]
async fn test_queries_do_not_touch_session() {
    let harness = seeded_harness();
    let controller = harness.spawn();
    controller.join_room(audience_request("R1")).await;

    controller.list_rooms(LiveState::Live, 1, 10).await;
    controller.room_info(LiveRecordId(1)).await;

    let status = controller.status().await.unwrap();
    assert_eq!(status.state, SessionState::Joined);
    assert_eq!(status.room_id, Some(RoomId::new("R1")));
    assert!(status.joined_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_room_info_refreshes_live_session_metadata() {
    let harness = seeded_harness();
    harness.directory.add_room(room_info("R1", 42));
    let controller = harness.spawn();
    controller.join_room(host_request("R1", 42)).await;

    let updated = RoomInfo {
        audience_count: 10,
        ..room_info("R1", 42)
    };
    harness.directory.add_room(updated.clone());

    // Another record leaves the session untouched
    controller.room_info(LiveRecordId(2)).await;
    let current = controller.current_room_info().await.into_payload().unwrap();
    assert_eq!(current, Some(room_info("R1", 42)));

    let fetched = controller.room_info(LiveRecordId(42)).await;
    assert_eq!(fetched.into_payload(), Some(updated.clone()));

    let current = controller.current_room_info().await.into_payload().unwrap();
    assert_eq!(current, Some(updated));
}

#[tokio::test(start_paused = true)]
async fn test_room_info_without_session_changes_nothing() {
    let harness = seeded_harness();
    let controller = harness.spawn();

    assert!(controller.room_info(LiveRecordId(1)).await.is_success());

    let status = controller.status().await.unwrap();
    assert_eq!(status.room_id, None);
    assert_eq!(status.joined_at, None);
    let current = controller.current_room_info().await.into_payload().unwrap();
    assert_eq!(current, None);
}
