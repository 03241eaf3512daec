//! Event type definitions for the session event bus.
//!
//! Events are cloneable and serializable so hosts can log or replay them.

use serde::{Deserialize, Serialize};

use crate::data::{DrawPhase, SessionId};

/// Root event enum for all editor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Session open/close and readiness
    Lifecycle(LifecycleEvent),
    /// Drawing state machine and ring updates
    Drawing(DrawingEvent),
    /// User-visible notices
    Notice(Notice),
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::Lifecycle(_) => EventCategory::Lifecycle,
            EditorEvent::Drawing(_) => EventCategory::Drawing,
            EditorEvent::Notice(_) => EventCategory::Notice,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::Lifecycle(e) => e.description(),
            EditorEvent::Drawing(e) => e.description(),
            EditorEvent::Notice(n) => format!("{}: {}", n.level, n.message),
        }
    }

    /// The notice carried by this event, if any
    pub fn as_notice(&self) -> Option<&Notice> {
        match self {
            EditorEvent::Notice(n) => Some(n),
            _ => None,
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Session lifecycle events.
    Lifecycle,
    /// Drawing state events.
    Drawing,
    /// User-visible notices.
    Notice,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Lifecycle => write!(f, "Lifecycle"),
            EventCategory::Drawing => write!(f, "Drawing"),
            EventCategory::Notice => write!(f, "Notice"),
        }
    }
}

/// Session lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A map instance was created for a new session.
    Opened {
        /// The new session.
        session: SessionId,
    },
    /// All handles of the session were released.
    Closed {
        /// The closed session.
        session: SessionId,
    },
    /// The drawing-tool plugin finished loading.
    ToolReady {
        /// The owning session.
        session: SessionId,
    },
    /// The drawing-tool plugin did not load in time.
    PluginTimedOut {
        /// The owning session.
        session: SessionId,
        /// The plugin name.
        plugin: String,
    },
}

impl LifecycleEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            LifecycleEvent::Opened { session } => format!("{} opened", session),
            LifecycleEvent::Closed { session } => format!("{} closed", session),
            LifecycleEvent::ToolReady { session } => format!("{} tool ready", session),
            LifecycleEvent::PluginTimedOut { session, plugin } => {
                format!("{} plugin {} timed out", session, plugin)
            }
        }
    }
}

/// Drawing state events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// The drawing state machine moved to a new phase.
    PhaseChanged {
        /// The owning session.
        session: SessionId,
        /// Previous phase.
        from: DrawPhase,
        /// New phase.
        to: DrawPhase,
    },
    /// The authoritative ring was replaced.
    RingUpdated {
        /// The owning session.
        session: SessionId,
        /// Number of validated points.
        points: usize,
    },
}

impl DrawingEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            DrawingEvent::PhaseChanged { session, from, to } => {
                format!("{} phase {} -> {}", session, from, to)
            }
            DrawingEvent::RingUpdated { session, points } => {
                format!("{} ring has {} points", session, points)
            }
        }
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// A non-fatal message for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Operator-facing text.
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
