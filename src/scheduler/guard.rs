//! Per-target overlap guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag that is set while a probe for one target is in flight.
#[derive(Debug, Default)]
pub struct OverlapGuard {
    running: AtomicBool,
}

impl OverlapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag false→true. `None` if a probe is already in flight.
    pub fn try_enter(self: &Arc<Self>) -> Option<GuardToken> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GuardToken {
                guard: Arc::clone(self),
            })
    }

    pub fn is_held(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof of a successful [`OverlapGuard::try_enter`]; resets the flag on drop.
#[derive(Debug)]
pub struct GuardToken {
    guard: Arc<OverlapGuard>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_enter_fails_until_release() {
        let guard = Arc::new(OverlapGuard::new());
        let token = guard.try_enter().unwrap();
        assert!(guard.is_held());
        assert!(guard.try_enter().is_none());

        drop(token);
        assert!(!guard.is_held());
        assert!(guard.try_enter().is_some());
    }
}
