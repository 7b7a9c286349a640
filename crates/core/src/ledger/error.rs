//! Ledger error types for validation, concurrency, and storage failures.

use thiserror::Error;
use vaultcore_shared::types::{AccountId, Money};

use super::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transaction must have at least 2 legs.
    #[error("Transaction must have at least 2 legs")]
    InsufficientLegs,

    /// Leg amount must be strictly positive.
    #[error("Leg amount must be strictly positive")]
    InvalidAmount,

    /// Transaction must reference at least 2 distinct accounts.
    #[error("Transaction must reference at least 2 distinct accounts")]
    SingleAccountTransaction,

    /// Transaction is not balanced (debits != credits).
    #[error("Transaction is not balanced. Debits: {debits}, Credits: {credits}")]
    UnbalancedTransaction {
        /// Total debit amount.
        debits: Money,
        /// Total credit amount.
        credits: Money,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is closed and cannot accept new entries.
    #[error("Account {0} is closed")]
    AccountClosed(AccountId),

    // ========== Concurrency Errors ==========
    /// Could not acquire account locks within the bounded wait.
    #[error("Could not acquire account locks within {waited_ms}ms, please retry")]
    LockTimeout {
        /// How long the post waited before giving up.
        waited_ms: u64,
    },

    // ========== Storage Errors ==========
    /// Underlying entry store failed; the transaction was not committed
    /// and the whole post is safe to retry.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLegs => "INSUFFICIENT_LEGS",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::SingleAccountTransaction => "SINGLE_ACCOUNT_TRANSACTION",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountClosed(_) => "ACCOUNT_CLOSED",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors, rejected before any
            // persistence
            Self::InsufficientLegs
            | Self::InvalidAmount
            | Self::SingleAccountTransaction
            | Self::UnbalancedTransaction { .. }
            | Self::AccountClosed(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) => 404,

            // 409 Conflict - transient contention
            Self::LockTimeout { .. } => 409,

            // 500 Internal Server Error
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if this error is transient and the whole post is safe
    /// to retry (idempotency on the transaction id makes retries harmless).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::Storage(_))
    }
}
