//! Type aliases for commonly used complex types.
//!
//! Map widgets share state between the owner's loop, timer tasks and the
//! capability provider; these aliases name the few wrappers that appear
//! across crates.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer hash map.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// A callback that receives a single parameter.
///
/// Thread-safe, suitable for delivering values from timer tasks.
pub type DataCallback<T> = Box<dyn Fn(T) + Send + Sync>;

/// A shared callback that can be cloned into spawned tasks.
pub type SharedCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A map of subscription IDs to callbacks for event bus patterns.
pub type SubscriptionMap<K, V> = ThreadSafeRwMap<K, V>;

/// Create a new `ThreadSafe<T>` from a value.
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
