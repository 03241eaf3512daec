//! # Fencekit Map
//!
//! Map drawing sessions for geofence and service-area editing.
//!
//! - [`capability`]: the contract an external map service implements
//! - [`session`]: opening and tearing down map instances
//! - [`tool`]: the one-shot drawing tool state machine
//! - [`overlay`] and [`marker`]: the single overlay each widget shows
//! - [`publisher`]: debounced ring publication
//! - [`editor`] and [`picker`]: the polygon editor and location picker
//! - [`headless`]: an in-memory capability for tests and previews

pub mod capability;
pub mod editor;
pub mod headless;
pub mod marker;
pub mod overlay;
pub mod picker;
pub mod publisher;
pub mod session;
pub mod tool;

pub use capability::{
    ContainerId, DrawTool, EventKind, EventSink, ListenerId, MapCapability, MapEvent, MapHandle,
    MapOptions, MarkerOverlay, OverlayId, PolygonOverlay, ProviderResult,
};
pub use editor::{GeofenceEditor, GeofenceHost};
pub use headless::HeadlessMap;
pub use marker::MarkerManager;
pub use overlay::OverlayManager;
pub use picker::{LocationPicker, PickerHost};
pub use publisher::DebouncedPublisher;
pub use session::{MapSession, MapSessionManager};
pub use tool::DrawingToolController;

use fencekit_core::{Error, Notice, SessionError};

/// Operator notice for an error caught at a callback boundary
pub(crate) fn notice_for(error: &Error) -> Notice {
    match error.as_session_error() {
        Some(
            SessionError::InsufficientPoints { .. }
            | SessionError::SessionNotReady
            | SessionError::NoSelection
            | SessionError::PluginTimeout { .. },
        ) => Notice::warning(error.notice_text()),
        _ => Notice::error(error.notice_text()),
    }
}
