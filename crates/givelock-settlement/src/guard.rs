//! Scoped reentrancy guard.
//!
//! Every state-mutating entry point acquires the guard for its full
//! duration. Untrusted code reached during token-transfer callbacks that
//! re-enters an entry point observes the held guard and is rejected
//! before it can touch any state. The span releases on every exit path,
//! including early returns and error propagation.

use std::cell::Cell;
use std::rc::Rc;

use givelock_types::{GivelockError, Result};

/// Mutual-exclusion flag held for the duration of a top-level call.
pub struct ReentrancyGuard {
    entered: Rc<Cell<bool>>,
}

/// RAII span proving the guard is held; releases on drop.
#[derive(Debug)]
pub struct ReentrancySpan {
    entered: Rc<Cell<bool>>,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entered: Rc::new(Cell::new(false)),
        }
    }

    /// Acquire the guard for the duration of the returned span.
    ///
    /// # Errors
    /// Returns [`GivelockError::ReentrancyDetected`] while already held.
    pub fn enter(&self) -> Result<ReentrancySpan> {
        if self.entered.get() {
            return Err(GivelockError::ReentrancyDetected);
        }
        self.entered.set(true);
        Ok(ReentrancySpan {
            entered: Rc::clone(&self.entered),
        })
    }

    /// Whether a span is currently live.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.entered.get()
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReentrancySpan {
    fn drop(&mut self) {
        self.entered.set(false);
    }
}
