//! Mutual exclusion behind a capability trait.
//!
//! Ingestion code is written against [`RawLock`], the `lock` / `try_lock` /
//! `unlock` capability of `lock_api`, rather than a concrete primitive. The
//! default backend is `parking_lot::RawMutex`; unit tests swap in a counting
//! fake to check lock discipline.
//!
//! [`SnapshotCell`] is the one place the provider shares state across threads:
//! it stores an `Arc<T>` and holds its lock only for the pointer clone or swap,
//! never across a read or parse.

use std::fmt;
use std::sync::Arc;

use parking_lot::lock_api::Mutex;

pub use parking_lot::RawMutex as DefaultLock;
pub use parking_lot::lock_api::RawMutex as RawLock;

/// Shared `Arc<T>` slot that is replaced, never mutated in place.
///
/// Readers get a clone of the current `Arc` and keep a consistent value for as
/// long as they hold it, regardless of later swaps.
pub struct SnapshotCell<T, L: RawLock = DefaultLock> {
    value: Mutex<L, Option<Arc<T>>>,
}

impl<T> SnapshotCell<T, DefaultLock> {
    pub fn new() -> Self {
        Self { value: Mutex::new(None) }
    }
}

impl<T> Default for SnapshotCell<T, DefaultLock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L: RawLock> SnapshotCell<T, L> {
    /// Empty cell guarded by the given lock.
    pub fn with_lock(lock: L) -> Self {
        Self { value: Mutex::from_raw(lock, None) }
    }

    /// Current snapshot, if any.
    pub fn load(&self) -> Option<Arc<T>> {
        self.value.lock().clone()
    }

    /// Publish a new snapshot and return the one it replaced.
    pub fn store(&self, value: Arc<T>) -> Option<Arc<T>> {
        self.value.lock().replace(value)
    }

    /// Remove the current snapshot.
    pub fn clear(&self) -> Option<Arc<T>> {
        self.value.lock().take()
    }
}

impl<T: fmt::Debug, L: RawLock> fmt::Debug for SnapshotCell<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCell").field("value", &self.load()).finish()
    }
}
