//! Business rule validation for proposed transactions.
//!
//! Validation is a pure, deterministic check with no side effects: the same
//! input always yields the same verdict, and nothing is persisted here.
//! Idempotent-replay detection is the engine's job, not the validator's.

use vaultcore_shared::types::{AccountId, Money};

use super::account::AccountDirectory;
use super::error::LedgerError;
use super::types::{PostTransactionInput, TransactionTotals, ValidatedTransaction};
use super::entry::Direction;

/// Validates a proposed transaction against the double-entry rules.
///
/// Checks, in order:
/// 1. at least 2 legs
/// 2. every amount strictly positive
/// 3. at least 2 distinct accounts
/// 4. every account exists and is open
/// 5. debit total equals credit total, exactly, on minor units
///
/// # Errors
///
/// Returns the first violated rule as a `LedgerError`.
pub fn validate(
    input: &PostTransactionInput,
    directory: &dyn AccountDirectory,
) -> Result<ValidatedTransaction, LedgerError> {
    if input.legs.len() < 2 {
        return Err(LedgerError::InsufficientLegs);
    }

    for leg in &input.legs {
        if !leg.amount.is_positive() {
            return Err(LedgerError::InvalidAmount);
        }
    }

    let mut accounts: Vec<AccountId> = input.legs.iter().map(|l| l.account_id).collect();
    accounts.sort_unstable();
    accounts.dedup();
    if accounts.len() < 2 {
        return Err(LedgerError::SingleAccountTransaction);
    }

    for &account_id in &accounts {
        if !directory.exists(account_id) {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        if directory.is_closed(account_id) {
            return Err(LedgerError::AccountClosed(account_id));
        }
    }

    let totals = leg_totals(input)?;
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedTransaction {
            debits: totals.debits,
            credits: totals.credits,
        });
    }

    Ok(ValidatedTransaction {
        transaction_id: input.transaction_id,
        legs: input.legs.clone(),
        accounts,
        totals,
        posted_by: input.posted_by,
    })
}

/// Sums the debit and credit sides of the proposed legs.
fn leg_totals(input: &PostTransactionInput) -> Result<TransactionTotals, LedgerError> {
    let mut debits = Money::ZERO;
    let mut credits = Money::ZERO;

    for leg in &input.legs {
        match leg.direction {
            Direction::Debit => {
                debits = debits
                    .checked_add(leg.amount)
                    .ok_or(LedgerError::InvalidAmount)?;
            }
            Direction::Credit => {
                credits = credits
                    .checked_add(leg.amount)
                    .ok_or(LedgerError::InvalidAmount)?;
            }
        }
    }

    Ok(TransactionTotals::new(debits, credits))
}
