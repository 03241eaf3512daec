use fencekit_core::{Error, NoticeLevel, SessionError};
use serde_json::json;

use crate::common::{draw, notices, ready_editor, square};

#[tokio::test(start_paused = true)]
async fn test_square_round_trip() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    assert_eq!(
        harness.editor.coordinate_summary(),
        "4 points selected: (116.300000, 39.900000) (116.400000, 39.900000) \
         (116.400000, 40.000000) (116.300000, 40.000000)"
    );

    let ring = harness.editor.finish().unwrap();
    assert_eq!(
        ring.to_pairs(),
        vec![[116.3, 39.9], [116.4, 39.9], [116.4, 40.0], [116.3, 40.0]]
    );

    let finished = harness.host.finished.lock();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0], ring);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_drawing_cannot_finish() {
    let mut harness = ready_editor().await;
    draw(
        &mut harness,
        vec![
            json!([116.3, 39.9]),
            json!(["x", 39.9]),
            json!([200, 10]),
            json!([116.3, 39.9]),
            json!([116.4, 40.0]),
        ],
    );

    assert_eq!(
        harness.editor.ring().to_pairs(),
        vec![[116.3, 39.9], [116.4, 40.0]]
    );

    let err = harness.editor.finish().unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::InsufficientPoints {
            required: 3,
            actual: 2
        })
    ));
    assert!(harness.host.finished.lock().is_empty());

    let notices = notices(&harness.bus);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test(start_paused = true)]
async fn test_finish_with_nothing_drawn() {
    let mut harness = ready_editor().await;

    let err = harness.editor.finish().unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::InsufficientPoints { actual: 0, .. })
    ));
    assert!(harness.host.finished.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_triangle_is_enough() {
    let mut harness = ready_editor().await;
    draw(
        &mut harness,
        vec![json!([116.3, 39.9]), json!([116.4, 39.9]), json!("116.35,40.0")],
    );
    assert_eq!(harness.editor.ring().len(), 2);

    draw(
        &mut harness,
        vec![
            json!([116.3, 39.9]),
            json!({"lng": 116.4, "lat": 39.9}),
            json!(["116.35", " 40.0 "]),
        ],
    );
    assert_eq!(harness.editor.finish().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_finish_keeps_session_open() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.editor.finish().unwrap();
    assert!(harness.editor.is_open());
    assert_eq!(harness.map.attached_polygons(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_notifies_host_and_tears_down() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.editor.cancel();
    assert_eq!(*harness.host.cancelled.lock(), 1);
    assert!(harness.host.finished.lock().is_empty());
    assert!(!harness.editor.is_open());
    assert_eq!(harness.map.live_maps(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_small_grid_square_and_sparse_input() {
    let mut harness = ready_editor().await;
    draw(
        &mut harness,
        vec![json!([10, 10]), json!([10, 20]), json!([20, 20]), json!([20, 10])],
    );
    assert_eq!(
        harness.editor.finish().unwrap().to_pairs(),
        vec![[10.0, 10.0], [10.0, 20.0], [20.0, 20.0], [20.0, 10.0]]
    );

    draw(
        &mut harness,
        vec![json!([10, 10]), json!(["bad"]), json!([200, 10]), json!([15, 15])],
    );
    assert_eq!(
        harness.editor.ring().to_pairs(),
        vec![[10.0, 10.0], [15.0, 15.0]]
    );
    assert!(harness.editor.finish().is_err());
    assert_eq!(harness.host.finished.lock().len(), 1);
}
