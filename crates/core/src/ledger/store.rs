//! Append-only ledger entry store.
//!
//! The store is the only shared mutable ledger state. Entries are rows that
//! are never updated or deleted after insert; `LedgerStore` is the seam a
//! durable (database-backed) store would implement, and
//! `InMemoryLedgerStore` is the implementation used for tests and
//! single-process deployments.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use vaultcore_shared::types::{AccountId, Money, TransactionId};

use super::entry::{Direction, LedgerEntry};

/// Errors from the entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entries for this transaction id already exist. The engine checks
    /// idempotency before appending, so hitting this means a caller
    /// bypassed it.
    #[error("Entries already exist for transaction {0}")]
    DuplicateTransaction(TransactionId),

    /// The underlying storage is unavailable; nothing was committed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of committed ledger entries.
///
/// `append` must be atomic: either every entry of the batch becomes
/// visible to every reader at once, or none does.
pub trait LedgerStore: Send + Sync {
    /// Atomically appends all entries of one transaction.
    fn append(&self, entries: Vec<LedgerEntry>) -> Result<(), StoreError>;

    /// Returns the entries of a transaction, in commit order.
    fn transaction_entries(&self, id: TransactionId) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Returns the entries touching an account, newest first.
    fn account_entries(&self, id: AccountId) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Returns true if any entries exist for the transaction id.
    fn contains_transaction(&self, id: TransactionId) -> Result<bool, StoreError>;

    /// Returns the (debit total, credit total) for an account.
    fn account_totals(&self, id: AccountId) -> Result<(Money, Money), StoreError>;

    /// Returns every entry in the store, in commit order. Used by the
    /// global zero-sum audit.
    fn all_entries(&self) -> Result<Vec<LedgerEntry>, StoreError>;
}

#[derive(Debug, Default)]
struct StoreInner {
    log: Vec<LedgerEntry>,
    by_transaction: HashMap<TransactionId, Vec<usize>>,
    by_account: HashMap<AccountId, Vec<usize>>,
}

/// In-memory append-only entry store.
///
/// A single `RwLock` over the log and its indexes makes every append
/// all-or-nothing from any reader's point of view: readers either see the
/// whole batch or none of it.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .log
            .len()
    }

    /// Returns true if no entries have been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, entries: Vec<LedgerEntry>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.first() {
            let transaction_id = entry.transaction_id;
            if inner.by_transaction.contains_key(&transaction_id) {
                return Err(StoreError::DuplicateTransaction(transaction_id));
            }
        }

        for entry in entries {
            let index = inner.log.len();
            inner
                .by_transaction
                .entry(entry.transaction_id)
                .or_default()
                .push(index);
            inner.by_account.entry(entry.account_id).or_default().push(index);
            inner.log.push(entry);
        }

        Ok(())
    }

    fn transaction_entries(&self, id: TransactionId) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner
            .by_transaction
            .get(&id)
            .map(|indexes| indexes.iter().map(|&i| inner.log[i].clone()).collect())
            .unwrap_or_default())
    }

    fn account_entries(&self, id: AccountId) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner
            .by_account
            .get(&id)
            .map(|indexes| indexes.iter().rev().map(|&i| inner.log[i].clone()).collect())
            .unwrap_or_default())
    }

    fn contains_transaction(&self, id: TransactionId) -> Result<bool, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.by_transaction.contains_key(&id))
    }

    fn account_totals(&self, id: AccountId) -> Result<(Money, Money), StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut debits = Money::ZERO;
        let mut credits = Money::ZERO;

        if let Some(indexes) = inner.by_account.get(&id) {
            for &i in indexes {
                let entry = &inner.log[i];
                match entry.direction {
                    Direction::Debit => debits += entry.amount,
                    Direction::Credit => credits += entry.amount,
                }
            }
        }

        Ok((debits, credits))
    }

    fn all_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.log.clone())
    }
}
