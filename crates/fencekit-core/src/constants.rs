//! Default values shared by the settings and map crates.

/// Default map centre (longitude, latitude).
pub const DEFAULT_CENTER: [f64; 2] = [116.397428, 39.90923];

/// Default map zoom level.
pub const DEFAULT_ZOOM: u8 = 11;

/// Quiet interval before a debounced ring is delivered to the host.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Polling interval while waiting for the map capability to appear.
pub const DEFAULT_CAPABILITY_POLL_MS: u64 = 100;

/// Upper bound on the wait for the map capability.
pub const DEFAULT_CAPABILITY_TIMEOUT_MS: u64 = 10_000;

/// Upper bound on the wait for the drawing-tool plugin.
pub const DEFAULT_PLUGIN_TIMEOUT_MS: u64 = 5_000;

/// Plugin that provides the drawing tool.
pub const DRAW_TOOL_PLUGIN: &str = "AMap.MouseTool";
