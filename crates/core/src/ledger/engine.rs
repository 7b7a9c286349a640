//! The ledger posting engine.
//!
//! `LedgerEngine` is the single write entry point: every mutation of ledger
//! state funnels through [`LedgerEngine::post`], which validates, locks,
//! appends atomically, and replays idempotently. Reads go through the same
//! engine so callers never touch the store directly.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use vaultcore_shared::config::LedgerConfig;
use vaultcore_shared::types::{AccountId, LedgerEntryId, Money, TransactionId, UserId};

use super::account::AccountDirectory;
use super::balance::{BalanceCalculator, RunningBalances};
use super::entry::{Direction, LedgerEntry};
use super::error::LedgerError;
use super::lock::AccountLockManager;
use super::store::LedgerStore;
use super::types::{
    PostTransactionInput, PostedTransaction, TransactionTotals, ValidatedTransaction,
};
use super::validation::validate;

/// Attribution recorded at commit time. The entries themselves live only in
/// the store; keeping just the caller and timestamp here lets replays report
/// the original attribution without duplicating the ledger in memory.
#[derive(Debug, Clone, Copy)]
struct PostMeta {
    posted_by: UserId,
    posted_at: DateTime<Utc>,
}

/// Orchestrates validation, locking, atomic append, and idempotent replay.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn AccountDirectory>,
    locks: AccountLockManager,
    running: RunningBalances,
    committed: DashMap<TransactionId, PostMeta>,
}

impl LedgerEngine {
    /// Creates an engine over the given store and account directory.
    ///
    /// The running balance cache is seeded from the store's existing
    /// entries, so maintained totals agree with the on-read aggregation
    /// even over history committed before this engine instance existed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        directory: Arc<dyn AccountDirectory>,
        config: &LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let running = RunningBalances::new();
        running.apply(&store.all_entries()?);
        Ok(Self {
            store,
            directory,
            locks: AccountLockManager::new(Duration::from_millis(config.lock_wait_ms)),
            running,
            committed: DashMap::new(),
        })
    }

    /// Posts a transaction: at-most-once, all-or-nothing.
    ///
    /// Replaying an already-committed transaction id returns the stored
    /// result unchanged and commits nothing; this makes retries after
    /// transient failures safe.
    ///
    /// # Errors
    ///
    /// - validation errors (`InsufficientLegs`, `InvalidAmount`,
    ///   `SingleAccountTransaction`, `UnbalancedTransaction`,
    ///   `AccountNotFound`, `AccountClosed`): rejected before any
    ///   persistence
    /// - `LockTimeout`: transient, retry the whole post
    /// - `Storage`: nothing was committed, retry the whole post
    pub fn post(&self, input: PostTransactionInput) -> Result<PostedTransaction, LedgerError> {
        // Fast-path replay without taking any locks.
        if let Some(replay) = self.replay(input.transaction_id)? {
            return Ok(replay);
        }

        let validated = validate(&input, self.directory.as_ref())?;
        debug!(
            transaction = %validated.transaction_id,
            legs = validated.legs.len(),
            total = %validated.totals.debits,
            "transaction validated"
        );

        let guard = self.locks.lock_accounts(&validated.accounts)?;

        // Two racing posts of the same id can both miss the fast path; the
        // re-check under the locks guarantees exactly one commit.
        if let Some(replay) = self.replay(input.transaction_id)? {
            return Ok(replay);
        }

        let posted = self.commit(validated)?;
        drop(guard);

        info!(
            transaction = %posted.transaction_id,
            entries = posted.entries.len(),
            total = %posted.totals.debits,
            "transaction posted"
        );
        Ok(posted)
    }

    /// Appends the validated legs as one atomic batch and records the
    /// committed result. Caller must hold the account locks.
    fn commit(&self, validated: ValidatedTransaction) -> Result<PostedTransaction, LedgerError> {
        let posted_at = Utc::now();
        let entries: Vec<LedgerEntry> = validated
            .legs
            .iter()
            .map(|leg| LedgerEntry {
                id: LedgerEntryId::new(),
                transaction_id: validated.transaction_id,
                account_id: leg.account_id,
                direction: leg.direction,
                amount: leg.amount,
                description: leg.description.clone(),
                created_at: posted_at,
            })
            .collect();

        self.store.append(entries.clone())?;
        // Same locks as the append, so the cache stays consistent with the
        // store.
        self.running.apply(&entries);

        self.committed.insert(
            validated.transaction_id,
            PostMeta {
                posted_by: validated.posted_by,
                posted_at,
            },
        );
        Ok(PostedTransaction {
            transaction_id: validated.transaction_id,
            entries,
            totals: validated.totals,
            posted_by: validated.posted_by,
            posted_at,
        })
    }

    /// Returns the previously committed result for a transaction id, if
    /// any. The entries always come from the store; attribution comes from
    /// the commit metadata when this engine instance did the commit.
    fn replay(&self, id: TransactionId) -> Result<Option<PostedTransaction>, LedgerError> {
        if self.store.contains_transaction(id)? {
            debug!(transaction = %id, "replaying committed transaction");
            return Ok(Some(self.rebuild_from_store(id)?));
        }
        Ok(None)
    }

    /// Rebuilds a committed result from the stored entries.
    fn rebuild_from_store(&self, id: TransactionId) -> Result<PostedTransaction, LedgerError> {
        let entries = self.store.transaction_entries(id)?;
        let debits: Money = entries
            .iter()
            .filter(|e| e.direction == Direction::Debit)
            .map(|e| e.amount)
            .sum();
        let credits: Money = entries
            .iter()
            .filter(|e| e.direction == Direction::Credit)
            .map(|e| e.amount)
            .sum();

        let (posted_by, posted_at) = match self.committed.get(&id).map(|m| *m) {
            Some(meta) => (meta.posted_by, meta.posted_at),
            // Attribution for rows committed by another process is not
            // recoverable from the entry layout; those replays report the
            // system user.
            None => (
                UserId::from_uuid(uuid::Uuid::nil()),
                entries.first().map_or_else(Utc::now, |e| e.created_at),
            ),
        };

        Ok(PostedTransaction {
            transaction_id: id,
            entries,
            totals: TransactionTotals::new(debits, credits),
            posted_by,
            posted_at,
        })
    }

    /// Derives the account's current balance from its entries.
    pub fn balance_of(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        self.calculator().balance_of(account_id)
    }

    /// Sum of all debit entries for the account.
    pub fn total_debits(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        self.calculator().total_debits(account_id)
    }

    /// Sum of all credit entries for the account.
    pub fn total_credits(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        self.calculator().total_credits(account_id)
    }

    /// Returns the entries touching an account, newest first.
    pub fn entries_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.store.account_entries(account_id)?)
    }

    /// Returns the entries of a transaction, in commit order.
    pub fn entries_for_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.store.transaction_entries(transaction_id)?)
    }

    /// Runs the global zero-sum consistency audit.
    pub fn audit_zero_sum(&self) -> Result<(), LedgerError> {
        self.calculator().audit_zero_sum()
    }

    /// Returns the maintained running totals for an account. Must always
    /// agree with the on-read aggregation for entries posted through this
    /// engine.
    #[must_use]
    pub fn running_totals(&self, account_id: AccountId) -> (Money, Money) {
        self.running.account_totals(account_id)
    }

    fn calculator(&self) -> BalanceCalculator<'_> {
        BalanceCalculator::new(self.store.as_ref(), self.directory.as_ref())
    }
}
