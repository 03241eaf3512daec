use fencekit_core::{DrawPhase, DrawingEvent, EditorEvent, Error, SessionError};
use fencekit_map::HeadlessMap;
use fencekit_settings::Config;
use serde_json::json;

use crate::common::{container, draw, editor_with, ready_editor, square};

fn ring_updates(harness: &crate::common::EditorHarness) -> usize {
    harness
        .bus
        .history(None)
        .into_iter()
        .filter(|e| matches!(e, EditorEvent::Drawing(DrawingEvent::RingUpdated { .. })))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_phases_through_a_drawing() {
    let mut harness = ready_editor().await;
    assert_eq!(harness.editor.phase(), DrawPhase::Idle);

    harness.editor.start_drawing().unwrap();
    assert_eq!(harness.editor.phase(), DrawPhase::Drawing);

    harness.map.finish_drawing(square());
    harness.editor.dispatch_pending();
    assert_eq!(harness.editor.phase(), DrawPhase::Editing);

    let phases: Vec<(DrawPhase, DrawPhase)> = harness
        .bus
        .history(None)
        .into_iter()
        .filter_map(|e| match e {
            EditorEvent::Drawing(DrawingEvent::PhaseChanged { from, to, .. }) => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (DrawPhase::Idle, DrawPhase::Armed),
            (DrawPhase::Armed, DrawPhase::Drawing),
            (DrawPhase::Drawing, DrawPhase::Completed),
            (DrawPhase::Completed, DrawPhase::Editing),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_drawing_before_tool_ready() {
    let map = HeadlessMap::new();
    map.set_auto_load_plugins(false);
    let mut harness = editor_with(map, Config::default());

    let err = harness.editor.start_drawing().unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::SessionNotReady)));

    harness.editor.show(Some(&container()), &[]).await.unwrap();
    let err = harness.editor.start_drawing().unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::SessionNotReady)));
    assert_eq!(harness.editor.phase(), DrawPhase::Idle);
    assert_eq!(harness.map.open_tools(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_double_fired_draw_is_handled_once() {
    let mut harness = ready_editor().await;
    harness.editor.start_drawing().unwrap();

    assert_eq!(harness.map.finish_drawing(square()), 1);
    assert_eq!(harness.map.finish_drawing(square()), 1);
    assert_eq!(harness.editor.dispatch_pending(), 2);

    assert_eq!(harness.map.attached_polygons(), 1);
    assert_eq!(harness.editor.ring().len(), 4);
    assert_eq!(ring_updates(&harness), 1);

    // Listener was removed with the first delivery.
    assert_eq!(harness.map.finish_drawing(square()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_redraw_keeps_single_overlay() {
    let mut harness = ready_editor().await;

    draw(&mut harness, square());
    let first = harness.editor.overlay_id().unwrap();

    draw(
        &mut harness,
        vec![json!([116.5, 39.8]), json!([116.6, 39.8]), json!([116.6, 39.7])],
    );
    let second = harness.editor.overlay_id().unwrap();

    assert_ne!(first, second);
    assert_eq!(harness.map.attached_polygons(), 1);
    assert_eq!(harness.editor.ring().len(), 3);
    assert_eq!(
        harness.map.polygon_paths()[0],
        vec![json!([116.5, 39.8]), json!([116.6, 39.8]), json!([116.6, 39.7])]
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_drawing_discards_existing_ring() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.editor.start_drawing().unwrap();
    assert!(harness.editor.ring().is_empty());
    assert_eq!(harness.map.attached_polygons(), 0);
    assert_eq!(harness.editor.phase(), DrawPhase::Drawing);
}

#[tokio::test(start_paused = true)]
async fn test_clear_returns_to_idle() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.editor.clear();
    assert_eq!(harness.editor.phase(), DrawPhase::Idle);
    assert!(harness.editor.ring().is_empty());
    assert_eq!(harness.map.attached_polygons(), 0);
    assert_eq!(harness.map.live_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_vertex_drag_updates_ring() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    assert_eq!(harness.map.move_vertex(2, json!([116.45, 40.05])), 1);
    harness.editor.dispatch_pending();

    let ring = harness.editor.ring();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring.points()[2].to_pair(), [116.45, 40.05]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_vertex_is_filtered_from_ring() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());

    harness.map.move_vertex(1, json!(["east", 39.9]));
    harness.editor.dispatch_pending();

    assert_eq!(harness.editor.ring().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_drag_start_highlights_overlay() {
    let mut config = Config::default();
    config.polygon.drag_fill_color = "#ff6600".to_string();
    let mut harness = editor_with(HeadlessMap::new(), config);
    harness.editor.show(Some(&container()), &[]).await.unwrap();
    harness.editor.dispatch_pending();
    draw(&mut harness, square());

    assert_eq!(harness.map.polygon_fill_colors(), vec!["#1791fc".to_string()]);
    harness.map.start_polygon_drag();
    harness.editor.dispatch_pending();
    assert_eq!(harness.map.polygon_fill_colors(), vec!["#ff6600".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_ring_is_editable() {
    let mut harness = editor_with(HeadlessMap::new(), Config::default());
    harness.editor.show(Some(&container()), &square()).await.unwrap();

    assert_eq!(harness.editor.phase(), DrawPhase::Editing);
    assert_eq!(harness.editor.ring().len(), 4);
    assert_eq!(harness.map.attached_polygons(), 1);
    assert_eq!(harness.map.fit_view_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_overlay_failure_leaves_no_overlay() {
    let mut harness = ready_editor().await;
    harness.editor.start_drawing().unwrap();
    harness.map.fail_next("add");

    harness.map.finish_drawing(square());
    harness.editor.dispatch_pending();

    assert_eq!(harness.map.attached_polygons(), 0);
    assert_eq!(harness.map.live_listeners(), 0);
    assert_eq!(harness.map.open_tools(), 0);
    assert_eq!(crate::common::notices(&harness.bus).len(), 1);
    assert_eq!(harness.editor.phase(), DrawPhase::Idle);
    assert_eq!(harness.editor.ring().len(), 4);
    assert_eq!(harness.editor.finish().unwrap().len(), 4);

    // The session is still usable.
    draw(&mut harness, square());
    assert_eq!(harness.map.attached_polygons(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_drawing_returns_to_idle() {
    let mut harness = ready_editor().await;
    draw(&mut harness, vec![json!("nonsense"), json!(null)]);

    assert_eq!(harness.editor.phase(), DrawPhase::Idle);
    assert_eq!(harness.map.attached_polygons(), 0);
    assert_eq!(harness.map.open_tools(), 0);
}
