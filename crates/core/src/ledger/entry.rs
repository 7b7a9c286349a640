//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vaultcore_shared::types::{AccountId, LedgerEntryId, Money, TransactionId};

/// Polarity of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Debit entry (increases asset/expense accounts, decreases
    /// liability/equity/income accounts).
    Debit,
    /// Credit entry (decreases asset/expense accounts, increases
    /// liability/equity/income accounts).
    Credit,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// A single immutable leg of a committed transaction.
///
/// Entries are append-only: once persisted they are never updated or
/// deleted. Corrections are posted as new, offsetting transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The transaction this entry belongs to.
    pub transaction_id: TransactionId,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Whether this is a debit or credit.
    pub direction: Direction,
    /// Amount, always strictly positive.
    pub amount: Money,
    /// Description for this line item.
    pub description: String,
    /// When the entry was committed.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    ///
    /// Summed across the whole ledger this is always exactly zero, which is
    /// the global double-entry consistency check.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => -self.amount,
        }
    }
}
