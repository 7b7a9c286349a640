//! Account classification and the account-directory boundary.
//!
//! Account metadata management is a collaborator of the ledger engine; the
//! engine only needs existence, open/closed state, and the classification
//! that fixes the balance sign convention. `AccountDirectory` is that
//! boundary, with an in-memory implementation for tests and single-process
//! deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vaultcore_shared::types::{AccountId, Money, UserId};

/// Account classification, fixed at creation.
///
/// Changing the classification of an account with history would silently
/// flip the sign of every derived balance, so it is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountClassification {
    /// Asset account (cash, receivables).
    Asset,
    /// Liability account (payables, deposits held).
    Liability,
    /// Equity account.
    Equity,
    /// Income account.
    Income,
    /// Expense account.
    Expense,
}

impl AccountClassification {
    /// Returns the normal balance side for this classification.
    #[must_use]
    pub fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::DebitNormal,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::CreditNormal,
        }
    }
}

impl std::fmt::Display for AccountClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        };
        write!(f, "{s}")
    }
}

/// The sign convention for balance derivation.
///
/// Standard accounting convention:
/// - Asset/Expense: balance = debits - credits (debit-normal)
/// - Liability/Equity/Income: balance = credits - debits (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    DebitNormal,
    /// Credit-normal accounts (Liability, Equity, Income).
    CreditNormal,
}

impl NormalBalance {
    /// Calculates the balance contribution of the given debit and credit
    /// totals under this convention.
    #[must_use]
    pub fn balance_change(self, debits: Money, credits: Money) -> Money {
        match self {
            Self::DebitNormal => debits - credits,
            Self::CreditNormal => credits - debits,
        }
    }
}

/// Account metadata as seen by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique identifier.
    pub id: AccountId,
    /// Human-readable account number, unique within the directory.
    pub account_number: String,
    /// Classification, immutable after creation.
    pub classification: AccountClassification,
    /// The user who owns this account.
    pub owner: UserId,
    /// Closed accounts are marked, never deleted, so ledger history for
    /// them stays derivable.
    pub closed: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Account lookup boundary consumed by the validator and balance
/// calculator.
pub trait AccountDirectory: Send + Sync {
    /// Returns true if the account exists.
    fn exists(&self, id: AccountId) -> bool;

    /// Returns the account's classification, if it exists.
    fn classification(&self, id: AccountId) -> Option<AccountClassification>;

    /// Returns true if the account exists and is marked closed.
    fn is_closed(&self, id: AccountId) -> bool;
}

/// In-memory account directory.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<AccountId, AccountRecord>>,
}

impl InMemoryAccountDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account and returns its record.
    pub fn register(
        &self,
        owner: UserId,
        classification: AccountClassification,
    ) -> AccountRecord {
        let now = Utc::now();
        let record = AccountRecord {
            id: AccountId::new(),
            account_number: generate_account_number(),
            classification,
            owner,
            closed: false,
            created_at: now,
            updated_at: now,
        };
        self.accounts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(record.id, record.clone());
        record
    }

    /// Marks an account closed. Closed accounts reject new postings but
    /// keep their history.
    ///
    /// Returns false if the account does not exist.
    pub fn close(&self, id: AccountId) -> bool {
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match accounts.get_mut(&id) {
            Some(record) => {
                record.closed = true;
                record.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the account record, if it exists.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<AccountRecord> {
        self.accounts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn exists(&self, id: AccountId) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(&id)
    }

    fn classification(&self, id: AccountId) -> Option<AccountClassification> {
        self.accounts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&id)
            .map(|r| r.classification)
    }

    fn is_closed(&self, id: AccountId) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&id)
            .is_some_and(|r| r.closed)
    }
}

/// Generates a human-readable account number: `ACC` followed by 12
/// uppercase hex characters.
fn generate_account_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ACC{}", hex[..12].to_uppercase())
}
