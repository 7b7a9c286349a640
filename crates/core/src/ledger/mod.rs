//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (debits and credits)
//! - Account classification and the balance sign convention
//! - Business rule validation for proposed transactions
//! - The append-only entry store
//! - Per-account locking for serialized commits
//! - Balance derivation (on-read and running)
//! - The posting engine, the single write entry point

pub mod account;
pub mod balance;
pub mod engine;
pub mod entry;
pub mod error;
pub mod lock;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod validation_props;

pub use account::{
    AccountClassification, AccountDirectory, AccountRecord, InMemoryAccountDirectory,
    NormalBalance,
};
pub use balance::{BalanceCalculator, RunningBalances};
pub use engine::LedgerEngine;
pub use entry::{Direction, LedgerEntry};
pub use error::LedgerError;
pub use lock::{AccountLockManager, AccountLockSet};
pub use store::{InMemoryLedgerStore, LedgerStore, StoreError};
pub use types::{
    PostTransactionInput, PostedTransaction, TransactionLeg, TransactionTotals,
    ValidatedTransaction,
};
pub use validation::validate;
