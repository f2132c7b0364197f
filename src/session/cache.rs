//! Generation-keyed cache of the parsed session description.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{SessionDescription, parse};
use crate::Result;

/// Parses session text only when its generation marker moves.
///
/// A generation whose text fails to parse is remembered, so the same bad text
/// is not re-parsed on every poll; the last good description stays current.
#[derive(Debug, Default, Clone)]
pub struct SessionCache {
    generation: Option<i32>,
    description: Option<Arc<SessionDescription>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `generation` has already been handled.
    pub fn is_current(&self, generation: i32) -> bool {
        self.generation == Some(generation)
    }

    /// Parse `text` for `generation` and make it current.
    ///
    /// On failure the previous description is kept and the error returned.
    pub fn update(&mut self, generation: i32, text: &str) -> Result<Arc<SessionDescription>> {
        self.generation = Some(generation);
        match parse(text) {
            Ok(description) => {
                debug!(generation, "session description updated");
                let description = Arc::new(description);
                self.description = Some(Arc::clone(&description));
                Ok(description)
            }
            Err(err) => {
                warn!(generation, error = %err, "keeping previous session description");
                Err(err)
            }
        }
    }

    /// Refresh from a source only if the generation moved.
    ///
    /// Returns `Ok(None)` when `generation` is already current; `text` is not
    /// called in that case.
    pub fn refresh(
        &mut self,
        generation: i32,
        text: impl FnOnce() -> Result<Option<String>>,
    ) -> Result<Option<Arc<SessionDescription>>> {
        if self.is_current(generation) {
            return Ok(None);
        }
        match text()? {
            Some(text) => self.update(generation, &text).map(Some),
            None => {
                self.generation = Some(generation);
                Ok(None)
            }
        }
    }

    pub fn description(&self) -> Option<Arc<SessionDescription>> {
        self.description.clone()
    }

    pub fn generation(&self) -> Option<i32> {
        self.generation
    }

    pub fn clear(&mut self) {
        self.generation = None;
        self.description = None;
    }
}
