//! Deferred cleanup that runs on every exit path.
//!
//! [`ScopedGuard`] owns a release action and runs it exactly once: either when
//! [`ScopedGuard::release`] is called or when the guard is dropped, including
//! during early returns through `?`. Releasing twice is a no-op.
//! [`ScopedGuard::dismiss`] hands ownership of the resource to someone else.
//!
//! ```rust
//! use paddock::guard::ScopedGuard;
//! use std::cell::Cell;
//!
//! let closed = Cell::new(0);
//! {
//!     let mut guard = ScopedGuard::new(|| closed.set(closed.get() + 1));
//!     guard.release();
//!     guard.release();
//! }
//! assert_eq!(closed.get(), 1);
//! ```

use std::fmt;

/// Runs a release action once, on explicit release or on drop.
#[must_use = "dropping a ScopedGuard immediately runs its release action"]
pub struct ScopedGuard<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> ScopedGuard<F> {
    /// Arm a guard with the given release action.
    pub fn new(action: F) -> Self {
        Self { action: Some(action) }
    }

    /// Run the release action now. Later calls and the eventual drop do nothing.
    pub fn release(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }

    /// Disarm the guard without running the action.
    pub fn dismiss(mut self) {
        self.action = None;
    }

    /// Whether the release action is still pending.
    pub fn is_armed(&self) -> bool {
        self.action.is_some()
    }
}

impl<F: FnOnce()> Drop for ScopedGuard<F> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<F: FnOnce()> fmt::Debug for ScopedGuard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedGuard").field("armed", &self.is_armed()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, TelemetryError};
    use std::cell::Cell;

    #[test]
    fn release_runs_once() {
        let count = Cell::new(0);
        let mut guard = ScopedGuard::new(|| count.set(count.get() + 1));
        assert!(guard.is_armed());
        guard.release();
        guard.release();
        assert!(!guard.is_armed());
        drop(guard);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_releases() {
        let count = Cell::new(0);
        {
            let _guard = ScopedGuard::new(|| count.set(count.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dismiss_skips_release() {
        let count = Cell::new(0);
        let guard = ScopedGuard::new(|| count.set(count.get() + 1));
        guard.dismiss();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn error_path_releases() {
        let count = Cell::new(0);

        let map_view = || -> Result<u32> {
            Err(TelemetryError::buffer_unavailable("second step failed"))
        };
        let open = || -> Result<u32> {
            let _handle = ScopedGuard::new(|| count.set(count.get() + 1));
            let view = map_view()?;
            Ok(view)
        };

        assert!(open().is_err());
        assert_eq!(count.get(), 1);
    }
}
