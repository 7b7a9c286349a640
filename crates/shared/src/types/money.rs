//! Money type with exact minor-unit arithmetic.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as scaled `i64` minor units (cents) with a fixed
//! scale of 2, matching typical currency precision. `rust_decimal` is used
//! only at the boundary for parsing, formatting, and serialization.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Errors from constructing a `Money` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The decimal input carries more precision than the fixed scale.
    #[error("Amount {0} has more than {MONEY_SCALE} decimal places")]
    PrecisionLoss(Decimal),

    /// The amount does not fit in the minor-unit representation.
    #[error("Amount out of representable range")]
    Overflow,
}

/// A monetary amount in a single unit of account.
///
/// Internally a scaled integer in minor units, so addition, subtraction,
/// negation, and comparison are exact. Negative values are representable
/// (balances can go negative); ledger legs reject them at validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units (cents).
    #[must_use]
    pub const fn from_minor_units(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole major units (e.g. dollars).
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the scaled value does not fit.
    pub fn from_major_units(major: i64) -> Result<Self, MoneyError> {
        major
            .checked_mul(100)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Creates an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::PrecisionLoss` if the value has more than two
    /// decimal places, or `MoneyError::Overflow` if it is out of range.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let scaled = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?;
        if !scaled.fract().is_zero() {
            return Err(MoneyError::PrecisionLoss(value));
        }
        let minor = scaled.to_i64().ok_or(MoneyError::Overflow)?;
        Ok(Self(minor))
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Returns the amount as a decimal with the fixed scale.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Exact checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Exact checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, m| acc + m)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl std::str::FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal: Decimal = s.parse().map_err(|_| MoneyError::Overflow)?;
        Self::from_decimal(decimal)
    }
}
