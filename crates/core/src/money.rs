use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// A euro amount held at cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn to_cents(self) -> i64 {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .unwrap_or_default()
    }

    /// Round half away from zero to whole cents.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(round_cents(decimal))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }
}

/// Largest magnitude accepted for a single amount read from a receipt or a
/// split sheet. Sums of such amounts stay far inside the range of [`Decimal`].
// 1_000_000_000_000 (0xE8_D4A5_1000), scale 0; `Decimal::new` is not const.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub fn within_limit(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}

/// Round an amount to two decimal places, half away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money::from_decimal(decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn cents_roundtrip() {
        assert_eq!(Money::from_cents(239).to_cents(), 239);
        assert_eq!(Money::from_cents(-150).to_cents(), -150);
    }

    #[test]
    fn from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec("2.345")).to_cents(), 235);
        assert_eq!(Money::from_decimal(dec("-2.345")).to_cents(), -235);
        assert_eq!(Money::from_decimal(dec("3.3333333")).to_cents(), 333);
    }

    #[test]
    fn display_uses_euro_sign_and_two_places() {
        assert_eq!(Money::from_cents(239).to_string(), "€2.39");
        assert_eq!(Money::from_cents(500).to_string(), "€5.00");
        assert_eq!(Money::from_cents(-75).to_string(), "€-0.75");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [100, 250, -50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.to_cents(), 300);
    }

    #[test]
    fn limit_is_inclusive_and_symmetric() {
        assert!(within_limit(MAX_AMOUNT));
        assert!(within_limit(-MAX_AMOUNT));
        assert!(!within_limit(MAX_AMOUNT + dec("0.01")));
        assert!(!within_limit(dec("-50000000000000000000000000000")));
    }

    #[test]
    fn to_cents_out_of_range_is_zero() {
        assert_eq!(Money(Decimal::MAX).to_cents(), 0);
    }

    #[test]
    fn negative_detection() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(Money::zero().is_zero());
    }
}
