//! Property-based tests for the posting engine.
//!
//! These cover the ledger-wide invariants: the global zero-sum check after
//! any sequence of valid posts, agreement between on-read aggregation and
//! the maintained running totals, and idempotent replay.

use std::sync::Arc;

use proptest::prelude::*;
use vaultcore_shared::config::LedgerConfig;
use vaultcore_shared::types::{AccountId, Money, TransactionId, UserId};

use super::account::{AccountClassification, AccountDirectory, InMemoryAccountDirectory};
use super::engine::LedgerEngine;
use super::entry::Direction;
use super::store::{InMemoryLedgerStore, LedgerStore};
use super::types::{PostTransactionInput, TransactionLeg};

/// A generated two-leg transfer between accounts picked by index.
#[derive(Debug, Clone)]
struct Transfer {
    debit_account: usize,
    credit_account: usize,
    amount: Money,
}

fn transfer_strategy(accounts: usize) -> impl Strategy<Value = Transfer> {
    (0..accounts, 0..accounts, 1i64..10_000_000i64).prop_filter_map(
        "legs must touch two distinct accounts",
        |(debit, credit, minor)| {
            (debit != credit).then_some(Transfer {
                debit_account: debit,
                credit_account: credit,
                amount: Money::from_minor_units(minor),
            })
        },
    )
}

fn transfers_strategy(accounts: usize, max_len: usize) -> impl Strategy<Value = Vec<Transfer>> {
    prop::collection::vec(transfer_strategy(accounts), 1..=max_len)
}

struct Fixture {
    engine: LedgerEngine,
    accounts: Vec<AccountId>,
}

fn fixture(accounts: usize) -> Fixture {
    let classifications = [
        AccountClassification::Asset,
        AccountClassification::Liability,
        AccountClassification::Equity,
        AccountClassification::Income,
        AccountClassification::Expense,
    ];
    let directory = Arc::new(InMemoryAccountDirectory::new());
    let ids: Vec<AccountId> = (0..accounts)
        .map(|i| {
            directory
                .register(UserId::new(), classifications[i % classifications.len()])
                .id
        })
        .collect();
    let engine = LedgerEngine::new(
        Arc::new(InMemoryLedgerStore::new()) as Arc<dyn LedgerStore>,
        directory as Arc<dyn AccountDirectory>,
        &LedgerConfig::default(),
    )
    .unwrap();
    Fixture {
        engine,
        accounts: ids,
    }
}

fn input_for(f: &Fixture, t: &Transfer) -> PostTransactionInput {
    PostTransactionInput {
        transaction_id: TransactionId::new(),
        legs: vec![
            TransactionLeg {
                account_id: f.accounts[t.debit_account],
                amount: t.amount,
                direction: Direction::Debit,
                description: "generated debit".to_string(),
            },
            TransactionLeg {
                account_id: f.accounts[t.credit_account],
                amount: t.amount,
                direction: Direction::Credit,
                description: "generated credit".to_string(),
            },
        ],
        posted_by: UserId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* sequence of valid posts, the global signed total over the
    /// whole ledger SHALL remain exactly zero.
    #[test]
    fn prop_global_zero_sum_holds(transfers in transfers_strategy(4, 20)) {
        let f = fixture(4);
        for t in &transfers {
            f.engine.post(input_for(&f, t)).unwrap();
        }
        prop_assert!(f.engine.audit_zero_sum().is_ok());
    }

    /// *For any* sequence of valid posts, the maintained running totals
    /// SHALL equal the on-read aggregation for every account.
    #[test]
    fn prop_running_totals_match_aggregation(transfers in transfers_strategy(4, 20)) {
        let f = fixture(4);
        for t in &transfers {
            f.engine.post(input_for(&f, t)).unwrap();
        }
        for &account in &f.accounts {
            let (debits, credits) = f.engine.running_totals(account);
            prop_assert_eq!(debits, f.engine.total_debits(account).unwrap());
            prop_assert_eq!(credits, f.engine.total_credits(account).unwrap());
        }
    }

    /// *For any* account, the derived balance SHALL equal debit total
    /// minus credit total (or the inverse), per the classification's
    /// normal-balance side.
    #[test]
    fn prop_balance_respects_sign_convention(transfers in transfers_strategy(4, 12)) {
        let f = fixture(4);
        for t in &transfers {
            f.engine.post(input_for(&f, t)).unwrap();
        }
        for &account in &f.accounts {
            let debits = f.engine.total_debits(account).unwrap();
            let credits = f.engine.total_credits(account).unwrap();
            let balance = f.engine.balance_of(account).unwrap();
            prop_assert!(
                balance == debits - credits || balance == credits - debits,
                "balance {} is neither sign of {} / {}", balance, debits, credits
            );
        }
    }

    /// *For any* committed transaction, replaying its id SHALL return the
    /// original result and leave the entry count unchanged.
    #[test]
    fn prop_replay_is_idempotent(transfers in transfers_strategy(3, 10)) {
        let f = fixture(3);
        let mut inputs = Vec::new();
        for t in &transfers {
            let input = input_for(&f, t);
            f.engine.post(input.clone()).unwrap();
            inputs.push(input);
        }

        let entry_counts: Vec<usize> = inputs
            .iter()
            .map(|i| f.engine.entries_for_transaction(i.transaction_id).unwrap().len())
            .collect();

        // Replay everything, twice, in reverse.
        for input in inputs.iter().rev().chain(inputs.iter()) {
            let replayed = f.engine.post(input.clone()).unwrap();
            prop_assert_eq!(replayed.transaction_id, input.transaction_id);
        }

        for (input, expected) in inputs.iter().zip(entry_counts) {
            prop_assert_eq!(
                f.engine.entries_for_transaction(input.transaction_id).unwrap().len(),
                expected
            );
        }
        prop_assert!(f.engine.audit_zero_sum().is_ok());
    }

    /// Posting moves exactly the posted amount: after a single transfer,
    /// the debited and credited accounts' totals both equal the amount.
    #[test]
    fn prop_single_transfer_totals(t in transfer_strategy(2)) {
        let f = fixture(2);
        f.engine.post(input_for(&f, &t)).unwrap();

        let debited = f.accounts[t.debit_account];
        let credited = f.accounts[t.credit_account];
        prop_assert_eq!(f.engine.total_debits(debited).unwrap(), t.amount);
        prop_assert_eq!(f.engine.total_credits(debited).unwrap(), Money::ZERO);
        prop_assert_eq!(f.engine.total_credits(credited).unwrap(), t.amount);
        prop_assert_eq!(f.engine.total_debits(credited).unwrap(), Money::ZERO);
    }
}
