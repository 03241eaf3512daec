//! Type aliases for shared state and callbacks.
//!
//! - [`aliases`]: `Arc<Mutex<T>>`, callback and subscription map aliases.

pub mod aliases;

pub use aliases::*;
