//! Cooperative cancellation of running replications

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{SimError, SimResult};

/// Shared flag checked by replications between periods
///
/// Clones share the flag. A child token is cancelled with its parent but can
/// also be cancelled on its own, and a token with a deadline reports
/// cancellation once the deadline has passed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Box<CancelToken>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that cancels itself `budget` from now
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(budget),
            ..Self::default()
        }
    }

    /// Token cancelled with `self`, by its own `cancel`, or after `budget`
    pub fn child(&self, budget: Option<Duration>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Box::new(self.clone())),
            deadline: budget.and_then(|b| Instant::now().checked_add(b)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// `Err(Cancelled)` once cancellation was requested
    pub fn check(&self) -> SimResult<()> {
        if self.is_cancelled() {
            Err(SimError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(other.check().is_ok());
        token.cancel();
        assert!(other.is_cancelled());
        assert!(other.check().unwrap_err().is_cancelled());
    }

    #[test]
    fn test_child_follows_parent_only_downwards() {
        let parent = CancelToken::new();
        let child = parent.child(None);
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let second = parent.child(Some(Duration::from_secs(3600)));
        assert!(!second.is_cancelled());
        parent.cancel();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_expired_budget_cancels() {
        assert!(CancelToken::with_budget(Duration::ZERO).is_cancelled());
        assert!(CancelToken::new().child(Some(Duration::ZERO)).is_cancelled());
    }
}
