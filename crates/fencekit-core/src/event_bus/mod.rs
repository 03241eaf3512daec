//! # Event Bus Module
//!
//! Publish/subscribe channel between map widgets and their host.
//!
//! Widgets publish lifecycle transitions, drawing-phase changes and
//! user-visible notices; the host subscribes to whatever it renders.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fencekit_core::event_bus::{EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notice]),
//!     |event| {
//!         if let Some(notice) = event.as_notice() {
//!             show_toast(&notice.message);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
