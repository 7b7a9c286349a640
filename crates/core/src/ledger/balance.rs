//! Account balance derivation.
//!
//! Balances are derived, not stored: `BalanceCalculator` aggregates the
//! entry store on read, while `RunningBalances` is an incrementally
//! maintained cache the engine updates inside the same locked append.
//! Both strategies must produce identical results for every account.

use dashmap::DashMap;
use vaultcore_shared::types::{AccountId, Money};

use super::account::{AccountDirectory, NormalBalance};
use super::entry::{Direction, LedgerEntry};
use super::error::LedgerError;
use super::store::LedgerStore;

/// On-read balance aggregation over the entry store.
pub struct BalanceCalculator<'a> {
    store: &'a dyn LedgerStore,
    directory: &'a dyn AccountDirectory,
}

impl<'a> BalanceCalculator<'a> {
    /// Creates a calculator over the given store and account directory.
    #[must_use]
    pub fn new(store: &'a dyn LedgerStore, directory: &'a dyn AccountDirectory) -> Self {
        Self { store, directory }
    }

    /// Derives the account's current balance under its classification's
    /// sign convention (asset/expense are debit-normal, the rest are
    /// credit-normal).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts and `Storage` if the
    /// store is unavailable.
    pub fn balance_of(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        let normal = self.normal_balance(account_id)?;
        let (debits, credits) = self.store.account_totals(account_id)?;
        Ok(normal.balance_change(debits, credits))
    }

    /// Sum of all debit entries for the account.
    pub fn total_debits(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        self.require_exists(account_id)?;
        let (debits, _) = self.store.account_totals(account_id)?;
        Ok(debits)
    }

    /// Sum of all credit entries for the account.
    pub fn total_credits(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        self.require_exists(account_id)?;
        let (_, credits) = self.store.account_totals(account_id)?;
        Ok(credits)
    }

    /// Sums every entry in the ledger with its signed amount.
    ///
    /// This is the global double-entry audit: because only balanced
    /// transactions ever commit, the result is always exactly zero.
    pub fn global_signed_total(&self) -> Result<Money, LedgerError> {
        let mut total = Money::ZERO;
        for entry in self.store.all_entries()? {
            total += entry.signed_amount();
        }
        Ok(total)
    }

    /// Runs the global zero-sum audit.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the net signed total is nonzero, which means
    /// the store was corrupted outside the engine's control.
    pub fn audit_zero_sum(&self) -> Result<(), LedgerError> {
        let net = self.global_signed_total()?;
        if net.is_zero() {
            Ok(())
        } else {
            Err(LedgerError::Storage(format!(
                "global double-entry audit failed: net signed total is {net}"
            )))
        }
    }

    fn normal_balance(&self, account_id: AccountId) -> Result<NormalBalance, LedgerError> {
        self.directory
            .classification(account_id)
            .map(super::account::AccountClassification::normal_balance)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    fn require_exists(&self, account_id: AccountId) -> Result<(), LedgerError> {
        if self.directory.exists(account_id) {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account_id))
        }
    }
}

/// Incrementally maintained per-account debit/credit totals.
///
/// Updated by the engine inside the same per-account locks as the append,
/// so the cache can never observe a partially applied transaction.
#[derive(Debug, Default)]
pub struct RunningBalances {
    totals: DashMap<AccountId, (Money, Money)>,
}

impl RunningBalances {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies committed entries to the running totals.
    pub fn apply(&self, entries: &[LedgerEntry]) {
        for entry in entries {
            let mut totals = self
                .totals
                .entry(entry.account_id)
                .or_insert((Money::ZERO, Money::ZERO));
            match entry.direction {
                Direction::Debit => totals.0 += entry.amount,
                Direction::Credit => totals.1 += entry.amount,
            }
        }
    }

    /// Returns the maintained (debit total, credit total) for an account.
    /// Accounts with no entries aggregate to zero.
    #[must_use]
    pub fn account_totals(&self, account_id: AccountId) -> (Money, Money) {
        self.totals
            .get(&account_id)
            .map_or((Money::ZERO, Money::ZERO), |t| *t)
    }

    /// Returns the maintained balance under the given sign convention.
    #[must_use]
    pub fn balance_of(&self, account_id: AccountId, normal: NormalBalance) -> Money {
        let (debits, credits) = self.account_totals(account_id);
        normal.balance_change(debits, credits)
    }
}
