//! Error handling for fencekit
//!
//! Provides error types for every layer of a drawing session:
//! - Session errors (capability lookup, readiness, commit gates)
//! - Provider errors (failures raised by the external map capability)
//! - Geo errors (typed coordinate construction)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Session error type
///
/// Represents failures of the drawing session state machine. None of these
/// are fatal: the session stays in a consistent phase and the user may retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The mapping capability is not present (script not loaded)
    #[error("Map capability unavailable")]
    CapabilityUnavailable,

    /// The mapping capability did not appear within the polling window
    #[error("Map capability did not load within {timeout_ms}ms")]
    CapabilityTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// No map container is bound yet
    #[error("Map container missing")]
    ContainerMissing,

    /// An auxiliary plugin did not finish loading in time
    #[error("Plugin {plugin} did not load within {timeout_ms}ms")]
    PluginTimeout {
        /// The plugin name.
        plugin: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Drawing was requested before the map and drawing tool were ready
    #[error("Drawing tool not ready")]
    SessionNotReady,

    /// Finish was requested with too few validated points
    #[error("At least {required} points are required, have {actual}")]
    InsufficientPoints {
        /// Minimum number of points for a polygon.
        required: usize,
        /// Number of validated points in the current ring.
        actual: usize,
    },

    /// The operation needs an open session
    #[error("No open map session")]
    SessionClosed,

    /// Confirm was requested before any location was selected
    #[error("No location selected")]
    NoSelection,
}

impl SessionError {
    /// Text shown to the operator when this error is surfaced as a notice
    pub fn notice_text(&self) -> String {
        match self {
            SessionError::CapabilityUnavailable => {
                "Map failed to load, check the network connection".to_string()
            }
            SessionError::CapabilityTimeout { .. } => {
                "Map loading timed out, check the network connection".to_string()
            }
            SessionError::ContainerMissing => "Map container is not ready".to_string(),
            SessionError::PluginTimeout { .. } => {
                "Drawing tool failed to load, reopen the map to retry".to_string()
            }
            SessionError::SessionNotReady => {
                "Map tool is not ready yet, retry shortly".to_string()
            }
            SessionError::InsufficientPoints { required, .. } => {
                format!("Select at least {required} points to draw an area")
            }
            SessionError::SessionClosed => "The map is closed".to_string(),
            SessionError::NoSelection => "Select a location on the map first".to_string(),
        }
    }
}

/// Provider error type
///
/// Raised by implementations of the external map capability. The session
/// catches these at the callback boundary and converts them into notices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The capability rejected an operation
    #[error("Map capability rejected {operation}: {reason}")]
    Rejected {
        /// The operation that failed.
        operation: String,
        /// The reason reported by the capability.
        reason: String,
    },

    /// The handle was already destroyed
    #[error("Map handle already released")]
    HandleReleased,
}

impl ProviderError {
    /// Create a rejection for the named operation
    pub fn rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        ProviderError::Rejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Geo error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Longitude or latitude is NaN or infinite
    #[error("Coordinate is not finite")]
    NonFinite,

    /// Longitude or latitude is outside the valid range
    #[error("Coordinate ({longitude}, {latitude}) out of range")]
    OutOfRange {
        /// The rejected longitude.
        longitude: f64,
        /// The rejected latitude.
        latitude: f64,
    },
}

/// Main error type for fencekit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Provider error
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Geo error
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Session(SessionError::CapabilityTimeout { .. })
                | Error::Session(SessionError::PluginTimeout { .. })
        )
    }

    /// Check if this is a session error
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }

    /// Check if this is a provider error
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Error::Provider(_))
    }

    /// The session error, if this is one
    pub fn as_session_error(&self) -> Option<&SessionError> {
        match self {
            Error::Session(e) => Some(e),
            _ => None,
        }
    }

    /// Text shown to the operator when this error is surfaced as a notice
    pub fn notice_text(&self) -> String {
        match self {
            Error::Session(e) => e.notice_text(),
            Error::Provider(_) => "Map operation failed, please retry".to_string(),
            Error::Geo(_) => "Invalid coordinate".to_string(),
            Error::Io(_) | Error::Other(_) => self.to_string(),
        }
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
