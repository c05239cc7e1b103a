//! Cancellation token for stopping a running fit.
//!
//! The trainer checks the token between epochs; a cancelled run returns
//! [`LearningError::Cancelled`](crate::LearningError::Cancelled) instead of a
//! trained model.
//!
//! # Example
//!
//! ```
//! use nimbus_learning::CancellationToken;
//!
//! let token = CancellationToken::new();
//! assert!(!token.is_cancelled());
//!
//! token.cancel();
//! assert!(token.is_cancelled());
//!
//! token.reset();
//! assert!(!token.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A token that can be used to signal cancellation of a fit.
///
/// Clones share state through an atomic flag, so the token can be handed to
/// another thread (a UI cancel button, a timeout watchdog) and cancelled
/// there.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// Tokens are shared with whatever thread drives cancellation.
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);

impl CancellationToken {
    /// Creates a new token in the non-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Thread-safe; visible to all clones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another fit.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}
