use fencekit_core::{Coordinate, Error, SessionError};
use fencekit_map::HeadlessMap;
use fencekit_settings::Config;
use serde_json::json;

use crate::common::{container, notices, picker_with, PickerHarness};

async fn open_picker(initial: Option<Coordinate>) -> PickerHarness {
    let mut harness = picker_with(HeadlessMap::new(), Config::default());
    harness
        .picker
        .show(Some(&container()), initial)
        .await
        .expect("picker opens");
    harness
}

#[tokio::test(start_paused = true)]
async fn test_click_selects_location() {
    let mut harness = open_picker(None).await;
    assert_eq!(harness.picker.selection(), None);

    assert_eq!(harness.map.click(json!([121.47, 31.23])), 1);
    harness.picker.dispatch_pending();

    let selected = harness.picker.selection().unwrap();
    assert_eq!(selected.to_pair(), [121.47, 31.23]);
    assert_eq!(harness.map.attached_markers(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_clicks_keep_one_marker() {
    let mut harness = open_picker(None).await;

    harness.map.click(json!([121.47, 31.23]));
    harness.map.click(json!({"lng": 121.5, "lat": 31.3}));
    harness.picker.dispatch_pending();

    assert_eq!(harness.map.attached_markers(), 1);
    assert_eq!(harness.map.marker_positions(), vec![json!([121.5, 31.3])]);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_click_is_ignored() {
    let mut harness = open_picker(None).await;

    harness.map.click(json!([999, 31.23]));
    harness.picker.dispatch_pending();

    assert_eq!(harness.picker.selection(), None);
    assert_eq!(harness.map.attached_markers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_initial_location_centres_and_marks() {
    let initial = Coordinate::new(113.26, 23.13).unwrap();
    let harness = open_picker(Some(initial)).await;

    let (_, options) = harness.map.last_map().unwrap();
    assert_eq!(options.center, initial);
    assert_eq!(harness.picker.selection(), Some(initial));
    assert_eq!(harness.map.attached_markers(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dragging_marker_moves_selection() {
    let initial = Coordinate::new(113.26, 23.13).unwrap();
    let mut harness = open_picker(Some(initial)).await;

    assert_eq!(harness.map.drag_marker(json!(["113.3", "23.2"])), 1);
    harness.picker.dispatch_pending();

    assert_eq!(harness.picker.selection().unwrap().to_pair(), [113.3, 23.2]);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_requires_selection() {
    let mut harness = open_picker(None).await;

    let err = harness.picker.confirm().unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::NoSelection)));
    assert_eq!(notices(&harness.bus).len(), 1);

    harness.map.click(json!([121.47, 31.23]));
    harness.picker.dispatch_pending();
    let confirmed = harness.picker.confirm().unwrap();
    assert_eq!(harness.host.confirmed.lock().as_slice(), &[confirmed]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_tears_down() {
    let mut harness = open_picker(None).await;
    harness.map.click(json!([121.47, 31.23]));
    harness.picker.dispatch_pending();

    harness.picker.cancel();
    assert_eq!(*harness.host.cancelled.lock(), 1);
    assert!(!harness.picker.is_open());
    assert_eq!(harness.map.live_maps(), 0);
    assert_eq!(harness.map.live_listeners(), 0);

    // Clicks after teardown reach nobody.
    assert_eq!(harness.map.click(json!([121.47, 31.23])), 0);
    harness.picker.cancel();
    assert_eq!(*harness.host.cancelled.lock(), 2);
}
