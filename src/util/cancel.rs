//! Cooperative cancellation for build and query work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{AnnexError, Result};

/// A clonable flag plus an optional deadline.
///
/// Clones share the flag, so cancelling any clone cancels them all. Work
/// polls [`CancellationToken::check`] at safe points and unwinds with an
/// error when it trips.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Create a token that never trips on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Attach a deadline `timeout` from now, keeping the shared flag.
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Return an error if the token was cancelled or its deadline passed.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(AnnexError::cancelled("cancellation requested"));
        }
        if self.is_expired() {
            return Err(AnnexError::timeout("deadline exceeded"));
        }
        Ok(())
    }
}
