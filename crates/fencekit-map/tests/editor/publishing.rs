use std::time::Duration;

use serde_json::json;

use crate::common::{draw, ready_editor, square};

#[tokio::test(start_paused = true)]
async fn test_ring_reaches_host_after_quiet_interval() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.editor.dispatch_pending();
    assert!(harness.host.changes.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    harness.editor.dispatch_pending();
    let changes = harness.host.changes.lock();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_publishes_last() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    for lat in [40.01, 40.02, 40.03] {
        harness.map.move_vertex(3, json!([116.3, lat]));
        harness.editor.dispatch_pending();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    harness.editor.dispatch_pending();

    let changes = harness.host.changes.lock();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].points()[3].to_pair(), [116.3, 40.03]);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_publication() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.editor.hide();
    tokio::time::sleep(Duration::from_millis(500)).await;
    harness.editor.dispatch_pending();

    assert!(harness.host.changes.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clear_publishes_empty_ring() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());
    tokio::time::sleep(Duration::from_millis(150)).await;
    harness.editor.dispatch_pending();

    harness.editor.clear();
    tokio::time::sleep(Duration::from_millis(150)).await;
    harness.editor.dispatch_pending();

    let changes = harness.host.changes.lock();
    assert_eq!(changes.len(), 2);
    assert!(changes[1].is_empty());
}
