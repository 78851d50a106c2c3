//! Reentrancy protection for ledger operations
//!
//! Every mutating ledger operation holds the guard from its first check until
//! its last token transfer has returned. The guard is a shared flag: clones
//! observe the same lock, so a token gateway or any other collaborator
//! handed a clone can see that an operation is in flight, and any attempt to
//! enter while it is held fails with `Reentrancy`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use types::errors::CrowdfundError;

/// Shared lock around the ledger's mutating operations.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the protected section. The returned hold releases it on drop,
    /// on every exit path.
    pub fn enter(&self) -> Result<GuardHold, CrowdfundError> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CrowdfundError::Reentrancy)?;
        Ok(GuardHold {
            locked: Arc::clone(&self.locked),
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// Proof of being inside the protected section.
#[must_use = "the guard is released as soon as the hold is dropped"]
#[derive(Debug)]
pub struct GuardHold {
    locked: Arc<AtomicBool>,
}

impl Drop for GuardHold {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_releases_on_drop() {
        let guard = ReentrancyGuard::new();
        {
            let _hold = guard.enter().unwrap();
            assert!(guard.is_locked());
        }
        assert!(!guard.is_locked());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_nested_enter_fails() {
        let guard = ReentrancyGuard::new();
        let _hold = guard.enter().unwrap();
        assert!(matches!(guard.enter(), Err(CrowdfundError::Reentrancy)));
    }

    #[test]
    fn test_clones_share_the_lock() {
        let guard = ReentrancyGuard::new();
        let observer = guard.clone();
        let hold = guard.enter().unwrap();
        assert!(observer.is_locked());
        assert!(matches!(observer.enter(), Err(CrowdfundError::Reentrancy)));
        drop(hold);
        assert!(!observer.is_locked());
    }
}
