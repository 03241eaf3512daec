//! Data models for drawing sessions.

pub mod geo;
pub mod session;

pub use geo::{Coordinate, Ring, MIN_POLYGON_POINTS};
pub use session::{DrawPhase, SessionId};
