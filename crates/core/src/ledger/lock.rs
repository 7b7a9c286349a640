//! Per-account locking for serialized commits.
//!
//! Concurrent posts touching overlapping account sets must not interleave,
//! or balance derivation and the global zero-sum invariant break. The lock
//! manager hands out exclusive per-account locks, always acquired in
//! ascending account id order so two posts with overlapping but
//! differently-ordered account sets cannot deadlock.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;
use vaultcore_shared::types::AccountId;

use super::error::LedgerError;

#[derive(Debug, Default)]
struct AccountSlot {
    locked: Mutex<bool>,
    unlocked: Condvar,
}

impl AccountSlot {
    /// Tries to take the slot, waiting at most `timeout`.
    fn acquire(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        while *locked {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()).filter(|d| !d.is_zero())
            else {
                return false;
            };
            let (guard, wait) = self
                .unlocked
                .wait_timeout(locked, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            locked = guard;
            if wait.timed_out() && *locked {
                return false;
            }
        }
        *locked = true;
        true
    }

    fn release(&self) {
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        *locked = false;
        self.unlocked.notify_one();
    }
}

/// Hands out exclusive locks over sets of accounts.
///
/// Slots are created lazily per account id and never removed; the registry
/// grows with the number of accounts ever posted to, which is bounded and
/// small relative to the entry log.
#[derive(Debug)]
pub struct AccountLockManager {
    slots: DashMap<AccountId, Arc<AccountSlot>>,
    wait: Duration,
}

impl AccountLockManager {
    /// Creates a lock manager with the given bounded wait per post.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            wait,
        }
    }

    /// Acquires exclusive locks on every distinct account, in ascending id
    /// order. Locks are released when the returned set is dropped.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::LockTimeout` if the whole set cannot be
    /// acquired within the bounded wait; everything acquired so far is
    /// released before returning.
    pub fn lock_accounts(&self, accounts: &[AccountId]) -> Result<AccountLockSet, LedgerError> {
        let mut ids: Vec<AccountId> = accounts.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let started = Instant::now();
        let mut held = Vec::with_capacity(ids.len());

        for id in ids {
            let slot = Arc::clone(
                &self
                    .slots
                    .entry(id)
                    .or_insert_with(|| Arc::new(AccountSlot::default())),
            );
            let remaining = self.wait.saturating_sub(started.elapsed());
            if !slot.acquire(remaining) {
                let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                warn!(account = %id, waited_ms, "lock acquisition timed out");
                // Dropping the partial set releases what we already hold.
                drop(AccountLockSet { held });
                return Err(LedgerError::LockTimeout { waited_ms });
            }
            held.push(slot);
        }

        Ok(AccountLockSet { held })
    }
}

/// An acquired set of account locks, released on drop.
#[derive(Debug)]
pub struct AccountLockSet {
    held: Vec<Arc<AccountSlot>>,
}

impl Drop for AccountLockSet {
    fn drop(&mut self) {
        // Release in reverse acquisition order.
        for slot in self.held.drain(..).rev() {
            slot.release();
        }
    }
}
