use std::sync::Arc;

use fencekit_core::{Coordinate, EditorEvent, Error, LifecycleEvent, SessionError};
use fencekit_map::{HeadlessMap, MapOptions, MapSessionManager};
use fencekit_settings::{Config, TimingSettings};

use crate::common::{container, draw, editor_with, ready_editor, square};

fn options() -> MapOptions {
    MapOptions {
        center: Coordinate::new(116.397428, 39.90923).unwrap(),
        zoom: 11,
    }
}

#[test]
fn test_open_requires_container() {
    let map = HeadlessMap::new();
    let sessions = MapSessionManager::new(Arc::new(map.clone()), TimingSettings::default());

    let err = sessions.open(None, options()).unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::ContainerMissing)));
    assert_eq!(map.maps_created(), 0);
}

#[test]
fn test_open_requires_capability() {
    let map = HeadlessMap::unavailable();
    let sessions = MapSessionManager::new(Arc::new(map.clone()), TimingSettings::default());

    let err = sessions.open(Some(&container()), options()).unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::CapabilityUnavailable)));
}

#[test]
fn test_close_is_idempotent() {
    let map = HeadlessMap::new();
    let sessions = MapSessionManager::new(Arc::new(map.clone()), TimingSettings::default());

    let mut session = sessions.open(Some(&container()), options()).unwrap();
    assert!(session.is_open());
    assert_eq!(map.live_maps(), 1);

    sessions.close(&mut session);
    sessions.close(&mut session);
    assert!(!session.is_open());
    assert!(session.map().is_err());
    assert_eq!(map.live_maps(), 0);
}

#[test]
fn test_sessions_get_fresh_identity() {
    let map = HeadlessMap::new();
    let sessions = MapSessionManager::new(Arc::new(map.clone()), TimingSettings::default());

    let first = sessions.open(Some(&container()), options()).unwrap();
    let second = sessions.open(Some(&container()), options()).unwrap();
    assert_ne!(first.id(), second.id());

    drop(first);
    assert_eq!(map.live_maps(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_map_uses_configured_view() {
    let mut config = Config::default();
    config.map.center = [121.47, 31.23];
    config.map.zoom = 14;
    let mut harness = editor_with(HeadlessMap::new(), config);

    harness.editor.show(Some(&container()), &[]).await.unwrap();

    let (container_id, options) = harness.map.last_map().unwrap();
    assert_eq!(container_id, container());
    assert_eq!(options.center.to_pair(), [121.47, 31.23]);
    assert_eq!(options.zoom, 14);
}

#[tokio::test(start_paused = true)]
async fn test_show_without_container_reports() {
    let mut harness = editor_with(HeadlessMap::new(), Config::default());

    let err = harness.editor.show(None, &[]).await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::ContainerMissing)));
    assert!(!harness.editor.is_open());
    assert_eq!(harness.map.maps_created(), 0);
    assert_eq!(crate::common::notices(&harness.bus).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_map_creation_leaves_nothing_open() {
    let map = HeadlessMap::new();
    map.fail_next("create_map");
    let mut harness = editor_with(map, Config::default());

    let err = harness.editor.show(Some(&container()), &[]).await.unwrap_err();
    assert!(err.is_provider_error());
    assert!(!harness.editor.is_open());
    assert_eq!(harness.map.live_maps(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_releases_everything() {
    let mut harness = ready_editor().await;
    draw(&mut harness, square());
    assert_eq!(harness.map.attached_polygons(), 1);
    assert!(harness.map.live_listeners() > 0);

    harness.editor.hide();
    assert!(!harness.editor.is_open());
    assert_eq!(harness.map.live_maps(), 0);
    assert_eq!(harness.map.attached_polygons(), 0);
    assert_eq!(harness.map.open_tools(), 0);
    assert_eq!(harness.map.live_listeners(), 0);

    harness.editor.hide();
    let closed = harness
        .bus
        .history(None)
        .into_iter()
        .filter(|e| matches!(e, EditorEvent::Lifecycle(LifecycleEvent::Closed { .. })))
        .count();
    assert_eq!(closed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_mid_drawing() {
    let mut harness = ready_editor().await;
    harness.editor.start_drawing().unwrap();
    assert_eq!(harness.map.open_tools(), 1);

    harness.editor.hide();
    assert_eq!(harness.map.open_tools(), 0);
    assert_eq!(harness.map.live_listeners(), 0);

    // The user finishing a sketch after teardown reaches nobody.
    assert_eq!(harness.map.finish_drawing(square()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_replaces_session() {
    let mut harness = ready_editor().await;
    let first = harness.editor.session_id().unwrap();
    draw(&mut harness, square());

    harness.editor.show(Some(&container()), &[]).await.unwrap();
    let second = harness.editor.session_id().unwrap();

    assert_ne!(first, second);
    assert_eq!(harness.map.live_maps(), 1);
    assert_eq!(harness.map.attached_polygons(), 0);
    assert!(harness.editor.ring().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_tears_down() {
    let harness = ready_editor().await;
    let map = harness.map.clone();
    assert_eq!(map.live_maps(), 1);

    drop(harness);
    assert_eq!(map.live_maps(), 0);
    assert_eq!(map.live_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zoom_controls() {
    let mut harness = ready_editor().await;

    harness.editor.zoom_in().unwrap();
    harness.editor.zoom_in().unwrap();
    harness.editor.zoom_out().unwrap();
    assert_eq!(harness.map.zoom(), Some(12));

    harness.editor.hide();
    assert!(harness.editor.zoom_in().is_err());
}
