//! Property-based tests for transaction validation rules.

use proptest::prelude::*;
use vaultcore_shared::types::{AccountId, Money, TransactionId, UserId};

use super::account::{AccountClassification, InMemoryAccountDirectory};
use super::entry::Direction;
use super::error::LedgerError;
use super::types::{PostTransactionInput, TransactionLeg};
use super::validation::validate;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(Money::from_minor_units)
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Debit), Just(Direction::Credit)]
}

fn leg(account_id: AccountId, direction: Direction, amount: Money) -> TransactionLeg {
    TransactionLeg {
        account_id,
        amount,
        direction,
        description: "prop leg".to_string(),
    }
}

/// Builds a directory with `n` open accounts cycling through all
/// classifications.
fn directory_with(n: usize) -> (InMemoryAccountDirectory, Vec<AccountId>) {
    let classifications = [
        AccountClassification::Asset,
        AccountClassification::Liability,
        AccountClassification::Equity,
        AccountClassification::Income,
        AccountClassification::Expense,
    ];
    let directory = InMemoryAccountDirectory::new();
    let ids = (0..n)
        .map(|i| {
            directory
                .register(UserId::new(), classifications[i % classifications.len()])
                .id
        })
        .collect();
    (directory, ids)
}

fn input(legs: Vec<TransactionLeg>) -> PostTransactionInput {
    PostTransactionInput {
        transaction_id: TransactionId::new(),
        legs,
        posted_by: UserId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of amounts mirrored onto both sides across two
    /// accounts, validation SHALL accept the transaction.
    #[test]
    fn prop_mirrored_legs_accepted(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let (directory, ids) = directory_with(2);
        let mut legs = Vec::new();
        for &amount in &amounts {
            legs.push(leg(ids[0], Direction::Debit, amount));
            legs.push(leg(ids[1], Direction::Credit, amount));
        }

        let validated = validate(&input(legs), &directory);
        prop_assert!(validated.is_ok(), "mirrored legs should balance, got: {:?}", validated.err());
        let validated = validated.unwrap();
        prop_assert!(validated.totals.is_balanced);
        prop_assert_eq!(validated.totals.debits, amounts.iter().copied().sum::<Money>());
    }

    /// *For any* balanced transaction perturbed by a nonzero delta on one
    /// side, validation SHALL reject it as unbalanced.
    #[test]
    fn prop_perturbed_transaction_rejected(
        amount in positive_amount(),
        delta in 1i64..1_000_000i64,
    ) {
        let (directory, ids) = directory_with(2);
        let skewed = Money::from_minor_units(amount.minor_units() + delta);
        let legs = vec![
            leg(ids[0], Direction::Debit, amount),
            leg(ids[1], Direction::Credit, skewed),
        ];

        let result = validate(&input(legs), &directory);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedTransaction { .. })),
            "skewed legs should be rejected, got: {:?}",
            result
        );
    }

    /// *For any* transaction containing a non-positive amount, validation
    /// SHALL reject it before checking balance.
    #[test]
    fn prop_non_positive_amount_rejected(
        direction in direction_strategy(),
        bad_minor in -1_000_000i64..=0i64,
        other in positive_amount(),
    ) {
        let (directory, ids) = directory_with(2);
        let legs = vec![
            leg(ids[0], direction, Money::from_minor_units(bad_minor)),
            leg(ids[1], direction.opposite(), other),
        ];

        let result = validate(&input(legs), &directory);
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidAmount)),
            "non-positive amount should be rejected, got: {:?}",
            result
        );
    }

    /// *For any* single leg, validation SHALL reject the transaction.
    #[test]
    fn prop_single_leg_rejected(direction in direction_strategy(), amount in positive_amount()) {
        let (directory, ids) = directory_with(1);
        let result = validate(&input(vec![leg(ids[0], direction, amount)]), &directory);
        prop_assert!(matches!(result, Err(LedgerError::InsufficientLegs)));
    }

    /// *For any* balanced pair of legs on a single account, validation
    /// SHALL reject the transaction: self-transfers need two accounts.
    #[test]
    fn prop_single_account_rejected(amount in positive_amount()) {
        let (directory, ids) = directory_with(1);
        let legs = vec![
            leg(ids[0], Direction::Debit, amount),
            leg(ids[0], Direction::Credit, amount),
        ];
        let result = validate(&input(legs), &directory);
        prop_assert!(matches!(result, Err(LedgerError::SingleAccountTransaction)));
    }

    /// Validation is deterministic: the same input always yields the same
    /// verdict.
    #[test]
    fn prop_validation_deterministic(
        amounts in prop::collection::vec(positive_amount(), 1..6),
        skew in 0i64..2i64,
    ) {
        let (directory, ids) = directory_with(2);
        let mut legs = Vec::new();
        for &amount in &amounts {
            legs.push(leg(ids[0], Direction::Debit, amount));
            legs.push(leg(ids[1], Direction::Credit, amount));
        }
        if skew > 0 {
            legs.push(leg(ids[1], Direction::Credit, Money::from_minor_units(skew)));
        }
        let input = input(legs);

        let first = validate(&input, &directory).map(|v| v.totals);
        let second = validate(&input, &directory).map(|v| v.totals);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.error_code(), b.error_code()),
            (a, b) => prop_assert!(false, "verdicts diverged: {:?} vs {:?}", a, b),
        }
    }
}
