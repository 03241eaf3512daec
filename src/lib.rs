//! # Fencekit
//!
//! Interactive geofence drawing over an injected map capability:
//! - Polygon editor with a one-shot drawing tool and a single editable overlay
//! - Location picker with a draggable marker
//! - Coordinate validation of untrusted capability output
//! - Debounced ring publication to the host
//!
//! ## Architecture
//!
//! Fencekit is organized as a workspace with multiple crates:
//!
//! 1. **fencekit-core** - Coordinates, validator, errors, event bus
//! 2. **fencekit-settings** - Widget configuration and persistence
//! 3. **fencekit-map** - Capability contract, sessions, editor, picker
//! 4. **fencekit** - This crate, re-exporting the above

pub use fencekit_core::{
    coerce_point, validate, validate_value, Coordinate, DrawPhase, DrawingEvent, EditorEvent,
    Error, EventBus, EventBusConfig, EventCategory, EventFilter, GeoError, LifecycleEvent, Notice,
    NoticeLevel, ProviderError, Result, Ring, SessionError, SessionId, SubscriptionId,
    MIN_POLYGON_POINTS,
};

pub use fencekit_settings::{
    default_config_path, Config, ConfigError, MapSettings, MarkerStyle, PluginSettings,
    PolygonStyle, SettingsError, TimingSettings,
};

pub use fencekit_map::{
    ContainerId, DrawTool, EventKind, EventSink, GeofenceEditor, GeofenceHost, HeadlessMap,
    ListenerId, LocationPicker, MapCapability, MapEvent, MapHandle, MapOptions, MapSession,
    MapSessionManager, MarkerOverlay, OverlayId, PickerHost, PolygonOverlay, ProviderResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
