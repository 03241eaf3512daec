//! # Fencekit Core
//!
//! Core types and utilities for fencekit.
//! Provides coordinates and rings, the coordinate validator, the error
//! taxonomy, and the session event bus.

pub mod constants;
pub mod data;
pub mod error;
pub mod event_bus;
pub mod types;
pub mod validator;

pub use data::{Coordinate, DrawPhase, Ring, SessionId, MIN_POLYGON_POINTS};

pub use error::{Error, GeoError, ProviderError, Result, SessionError};

pub use event_bus::{
    DrawingEvent, EditorEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    LifecycleEvent, Notice, NoticeLevel, SubscriptionId,
};

pub use types::{thread_safe, DataCallback, SharedCallback, ThreadSafe};

pub use validator::{coerce_point, validate, validate_value};
