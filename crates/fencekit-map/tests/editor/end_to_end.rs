use std::time::Duration;

use fencekit_map::HeadlessMap;
use fencekit_settings::Config;
use serde_json::json;

use crate::common::{container, editor_with, notices};

#[tokio::test(start_paused = true)]
async fn test_configured_editor_draws_and_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fencekit.toml");
    let mut config = Config::default();
    config.timing.debounce_ms = 250;
    config.save_to_file(&path).unwrap();
    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.timing.debounce_ms, 250);

    let mut harness = editor_with(HeadlessMap::new(), config);
    harness.editor.show(Some(&container()), &[]).await.unwrap();
    harness.editor.dispatch_pending();

    harness.editor.start_drawing().unwrap();
    harness.map.finish_drawing(vec![
        json!([116.3, 39.9]),
        json!([116.4, 39.9]),
        json!([116.4, 40.0]),
    ]);
    harness.editor.dispatch_pending();

    tokio::time::sleep(Duration::from_millis(150)).await;
    harness.editor.dispatch_pending();
    assert!(harness.host.changes.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(150)).await;
    harness.editor.dispatch_pending();
    assert_eq!(harness.host.changes.lock().last().map(|r| r.len()), Some(3));

    let ring = harness.editor.finish().unwrap();
    assert_eq!(harness.host.finished.lock().as_slice(), &[ring]);
    assert!(notices(&harness.bus).is_empty());

    harness.editor.hide();
    assert_eq!(harness.map.live_maps(), 0);
}
