//! Session identity and drawing phases.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one visible period of a map widget.
///
/// Every callback the session registers is stamped with this id so that
/// deliveries addressed to a torn-down session can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session({})", &self.0.to_string()[..8])
    }
}

/// Phase of the drawing tool state machine.
///
/// `Idle → Armed → Drawing → Completed → Editing`; any phase returns to
/// `Idle` on clear or teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawPhase {
    /// No drawing tool and no overlay.
    #[default]
    Idle,
    /// Drawing tool created, draw-complete listener registered.
    Armed,
    /// The tool is collecting vertices from the user.
    Drawing,
    /// Draw-complete delivered; listener disarmed.
    Completed,
    /// Editable overlay is on the map.
    Editing,
}

impl std::fmt::Display for DrawPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawPhase::Idle => write!(f, "Idle"),
            DrawPhase::Armed => write!(f, "Armed"),
            DrawPhase::Drawing => write!(f, "Drawing"),
            DrawPhase::Completed => write!(f, "Completed"),
            DrawPhase::Editing => write!(f, "Editing"),
        }
    }
}
