//! Domain types for transaction posting.
//!
//! These are the inputs accepted by the posting engine and the committed
//! results it returns. A transaction is a logical grouping: it has no row
//! of its own, only the shared transaction id across its entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vaultcore_shared::types::{AccountId, Money, TransactionId, UserId};

use super::entry::{Direction, LedgerEntry};

/// One proposed leg of a transaction: which account moves, by how much,
/// and in which direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLeg {
    /// The account to post to.
    pub account_id: AccountId,
    /// The amount (must be strictly positive).
    pub amount: Money,
    /// Whether this leg debits or credits the account.
    pub direction: Direction,
    /// Description carried onto the committed entry.
    pub description: String,
}

/// Input for posting a transaction.
#[derive(Debug, Clone)]
pub struct PostTransactionInput {
    /// Caller-supplied transaction id; posting the same id twice replays
    /// the original result instead of committing again.
    pub transaction_id: TransactionId,
    /// The proposed legs (at least 2, across at least 2 accounts).
    pub legs: Vec<TransactionLeg>,
    /// The authenticated caller, recorded for audit.
    pub posted_by: UserId,
}

/// Debit and credit totals for a set of legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Sum of all debit legs.
    pub debits: Money,
    /// Sum of all credit legs.
    pub credits: Money,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debits: Money, credits: Money) -> Self {
        Self {
            debits,
            credits,
            is_balanced: debits == credits,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Money {
        self.debits - self.credits
    }
}

/// A transaction that passed validation and is ready to commit.
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    /// The transaction id.
    pub transaction_id: TransactionId,
    /// The validated legs, in submission order.
    pub legs: Vec<TransactionLeg>,
    /// Distinct referenced accounts, ascending. This is the lock
    /// acquisition order.
    pub accounts: Vec<AccountId>,
    /// The balanced totals.
    pub totals: TransactionTotals,
    /// The caller, carried through for audit.
    pub posted_by: UserId,
}

/// The committed result of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedTransaction {
    /// The transaction id.
    pub transaction_id: TransactionId,
    /// The committed entries, in leg order.
    pub entries: Vec<LedgerEntry>,
    /// The (balanced) totals.
    pub totals: TransactionTotals,
    /// The caller that posted the transaction.
    pub posted_by: UserId,
    /// When the transaction was committed.
    pub posted_at: DateTime<Utc>,
}
