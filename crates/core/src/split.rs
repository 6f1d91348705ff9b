use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{round_cents, Money};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("Line '{product}' has {found} weights but there are {expected} people")]
    WeightCount {
        product: String,
        expected: usize,
        found: usize,
    },
    #[error("Person '{0}' is listed more than once")]
    DuplicatePerson(String),
    #[error("Amount for '{0}' is out of range")]
    Overflow(String),
}

/// One purchased item annotated with how many shares each person takes.
///
/// `weights[i]` belongs to the i-th person of the people list passed to
/// [`allocate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLine {
    pub product: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub weights: Vec<u32>,
}

impl SplitLine {
    pub fn new(product: impl Into<String>, price: Decimal, weights: Vec<u32>) -> Self {
        Self { product: product.into(), price, weights }
    }

    pub fn weight_total(&self) -> u64 {
        self.weights.iter().map(|&w| u64::from(w)).sum()
    }
}

/// Full-precision amount owed by one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonTotal {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Result of distributing a set of split lines across people.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    totals: Vec<PersonTotal>,
    /// Sum of every line's price, shared or not.
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    /// Sum of the prices of lines that carry at least one share.
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_total: Decimal,
    /// Lines whose weights sum to zero; they are left out of the split.
    pub excluded_lines: usize,
}

impl Allocation {
    /// Per-person totals in the order the people were given.
    pub fn totals(&self) -> &[PersonTotal] {
        &self.totals
    }

    pub fn amount_for(&self, name: &str) -> Option<Decimal> {
        self.totals.iter().find(|t| t.name == name).map(|t| t.amount)
    }

    /// Round every total to cents so that the rounded amounts add up to the
    /// rounded allocated total exactly.
    ///
    /// Each amount is floored to whole cents and the cents still missing are
    /// handed out one by one to the largest remainders. Ties go to the person
    /// listed first. Amounts too large to count in cents are an
    /// [`SplitError::Overflow`].
    pub fn reconciled(&self) -> Result<Vec<(String, Money)>, SplitError> {
        let hundred = Decimal::ONE_HUNDRED;
        let mut floors: Vec<(i64, Decimal)> = Vec::with_capacity(self.totals.len());
        for t in &self.totals {
            let overflow = || SplitError::Overflow(t.name.clone());
            let scaled = t.amount.checked_mul(hundred).ok_or_else(overflow)?;
            let floor = scaled.floor();
            let cents = floor.to_i64().ok_or_else(overflow)?;
            floors.push((cents, scaled - floor));
        }

        let total_overflow = || SplitError::Overflow("total".to_string());
        let target = round_cents(self.allocated_total)
            .checked_mul(hundred)
            .and_then(|c| c.to_i64())
            .ok_or_else(total_overflow)?;
        let floored = floors
            .iter()
            .try_fold(0i64, |acc, (cents, _)| acc.checked_add(*cents))
            .ok_or_else(total_overflow)?;
        let missing = target
            .checked_sub(floored)
            .ok_or_else(total_overflow)?
            .clamp(0, floors.len() as i64) as usize;

        let mut order: Vec<usize> = (0..floors.len()).collect();
        order.sort_by(|&a, &b| floors[b].1.cmp(&floors[a].1));

        let mut cents: Vec<i64> = floors.iter().map(|(c, _)| *c).collect();
        for &idx in order.iter().take(missing) {
            cents[idx] = cents[idx].checked_add(1).ok_or_else(total_overflow)?;
        }

        Ok(self
            .totals
            .iter()
            .zip(cents)
            .map(|(t, c)| (t.name.clone(), Money::from_cents(c)))
            .collect())
    }
}

/// Distribute each line's price across `people` in proportion to their weights.
///
/// Every person starts at zero. A line whose weights sum to zero contributes
/// to nobody. Amounts are kept at full precision; rounding is left to the
/// caller (see [`Allocation::reconciled`]). Sums or shares beyond the range
/// of [`Decimal`] are an [`SplitError::Overflow`] naming the line.
pub fn allocate(lines: &[SplitLine], people: &[String]) -> Result<Allocation, SplitError> {
    for (i, name) in people.iter().enumerate() {
        if people[..i].contains(name) {
            return Err(SplitError::DuplicatePerson(name.clone()));
        }
    }

    let mut amounts = vec![Decimal::ZERO; people.len()];
    let mut grand_total = Decimal::ZERO;
    let mut allocated_total = Decimal::ZERO;
    let mut excluded_lines = 0;

    for line in lines {
        if line.weights.len() != people.len() {
            return Err(SplitError::WeightCount {
                product: line.product.clone(),
                expected: people.len(),
                found: line.weights.len(),
            });
        }

        let overflow = || SplitError::Overflow(line.product.clone());
        grand_total = grand_total.checked_add(line.price).ok_or_else(overflow)?;

        let total_weight = line.weight_total();
        if total_weight == 0 {
            excluded_lines += 1;
            continue;
        }
        allocated_total = allocated_total.checked_add(line.price).ok_or_else(overflow)?;

        let divisor = Decimal::from(total_weight);
        for (amount, &weight) in amounts.iter_mut().zip(&line.weights) {
            if weight > 0 {
                let current = *amount;
                *amount = line
                    .price
                    .checked_mul(Decimal::from(weight))
                    .and_then(|v| v.checked_div(divisor))
                    .and_then(|share| current.checked_add(share))
                    .ok_or_else(overflow)?;
            }
        }
    }

    let totals = people
        .iter()
        .cloned()
        .zip(amounts)
        .map(|(name, amount)| PersonTotal { name, amount })
        .collect();

    Ok(Allocation { totals, grand_total, allocated_total, excluded_lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn people(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn epsilon() -> Decimal {
        Decimal::new(1, 20)
    }

    // ── allocate ──────────────────────────────────────────────────────────────

    #[test]
    fn weights_split_price_proportionally() {
        let lines = vec![SplitLine::new("Pizza", dec("9.00"), vec![1, 2])];
        let alloc = allocate(&lines, &people(&["Alice", "Bob"])).unwrap();
        assert_eq!(alloc.amount_for("Alice"), Some(dec("3.00")));
        assert_eq!(alloc.amount_for("Bob"), Some(dec("6.00")));
    }

    #[test]
    fn totals_accumulate_across_lines() {
        let lines = vec![
            SplitLine::new("Bread", dec("2.40"), vec![1, 1]),
            SplitLine::new("Cheese", dec("5.00"), vec![0, 1]),
        ];
        let alloc = allocate(&lines, &people(&["Alice", "Bob"])).unwrap();
        assert_eq!(alloc.amount_for("Alice"), Some(dec("1.20")));
        assert_eq!(alloc.amount_for("Bob"), Some(dec("6.20")));
        assert_eq!(alloc.grand_total, dec("7.40"));
    }

    #[test]
    fn zero_weight_line_is_excluded() {
        let lines = vec![
            SplitLine::new("Bag", dec("0.25"), vec![0, 0]),
            SplitLine::new("Milk", dec("1.10"), vec![1, 0]),
        ];
        let alloc = allocate(&lines, &people(&["Alice", "Bob"])).unwrap();
        assert_eq!(alloc.excluded_lines, 1);
        assert_eq!(alloc.grand_total, dec("1.35"));
        assert_eq!(alloc.allocated_total, dec("1.10"));
        assert_eq!(alloc.amount_for("Alice"), Some(dec("1.10")));
        assert_eq!(alloc.amount_for("Bob"), Some(Decimal::ZERO));
    }

    #[test]
    fn people_without_lines_stay_at_zero() {
        let alloc = allocate(&[], &people(&["Alice", "Bob"])).unwrap();
        assert_eq!(alloc.totals().len(), 2);
        assert!(alloc.totals().iter().all(|t| t.amount.is_zero()));
    }

    #[test]
    fn totals_keep_people_order() {
        let lines = vec![SplitLine::new("Tea", dec("3.00"), vec![1, 1, 1])];
        let alloc = allocate(&lines, &people(&["Carol", "Alice", "Bob"])).unwrap();
        let names: Vec<&str> = alloc.totals().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Carol", "Alice", "Bob"]);
    }

    #[test]
    fn negative_price_reduces_share() {
        let lines = vec![
            SplitLine::new("Wine", dec("10.00"), vec![1, 1]),
            SplitLine::new("Bonus", dec("-2.00"), vec![1, 1]),
        ];
        let alloc = allocate(&lines, &people(&["Alice", "Bob"])).unwrap();
        assert_eq!(alloc.amount_for("Alice"), Some(dec("4.00")));
    }

    #[test]
    fn conservation_within_epsilon() {
        let lines = vec![
            SplitLine::new("A", dec("10.00"), vec![1, 1, 1]),
            SplitLine::new("B", dec("7.33"), vec![2, 0, 5]),
            SplitLine::new("C", dec("0.99"), vec![3, 3, 1]),
            SplitLine::new("D", dec("4.00"), vec![0, 0, 0]),
        ];
        let alloc = allocate(&lines, &people(&["A", "B", "C"])).unwrap();
        let sum: Decimal = alloc.totals().iter().map(|t| t.amount).sum();
        assert!((sum - alloc.allocated_total).abs() < epsilon());
        assert_eq!(alloc.allocated_total, dec("18.32"));
    }

    #[test]
    fn weight_count_mismatch_is_an_error() {
        let lines = vec![SplitLine::new("Soup", dec("3.00"), vec![1])];
        let err = allocate(&lines, &people(&["Alice", "Bob"])).unwrap_err();
        assert_eq!(
            err,
            SplitError::WeightCount { product: "Soup".into(), expected: 2, found: 1 }
        );
    }

    #[test]
    fn duplicate_person_is_an_error() {
        let err = allocate(&[], &people(&["Alice", "Alice"])).unwrap_err();
        assert_eq!(err, SplitError::DuplicatePerson("Alice".into()));
    }

    #[test]
    fn total_past_decimal_range_is_an_overflow() {
        let lines = vec![
            SplitLine::new("A", Decimal::MAX, vec![1]),
            SplitLine::new("B", Decimal::MAX, vec![1]),
        ];
        let err = allocate(&lines, &people(&["Alice"])).unwrap_err();
        assert_eq!(err, SplitError::Overflow("B".into()));
    }

    #[test]
    fn share_past_decimal_range_is_an_overflow() {
        let lines = vec![SplitLine::new("Gold", Decimal::MAX, vec![2, 0])];
        let err = allocate(&lines, &people(&["Alice", "Bob"])).unwrap_err();
        assert_eq!(err, SplitError::Overflow("Gold".into()));
    }

    #[test]
    fn allocation_serializes_amounts_as_numbers() {
        let lines = vec![SplitLine::new("Pizza", dec("9.00"), vec![1, 2])];
        let alloc = allocate(&lines, &people(&["Alice", "Bob"])).unwrap();
        let json = serde_json::to_value(&alloc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totals": [
                    { "name": "Alice", "amount": 3.0 },
                    { "name": "Bob", "amount": 6.0 }
                ],
                "grand_total": 9.0,
                "allocated_total": 9.0,
                "excluded_lines": 0
            })
        );
    }

    #[test]
    fn split_line_json_round_trip() {
        let line = SplitLine::new("Bread", dec("2.39"), vec![1, 0]);
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"product":"Bread","price":2.39,"weights":[1,0]}"#);
        assert_eq!(serde_json::from_str::<SplitLine>(&json).unwrap(), line);
    }

    // ── reconciled ────────────────────────────────────────────────────────────

    #[test]
    fn reconciled_matches_rounded_total() {
        let lines = vec![SplitLine::new("Cake", dec("10.00"), vec![1, 1, 1])];
        let alloc = allocate(&lines, &people(&["A", "B", "C"])).unwrap();
        let rounded = alloc.reconciled().unwrap();
        let cents: Vec<i64> = rounded.iter().map(|(_, m)| m.to_cents()).collect();
        assert_eq!(cents, [334, 333, 333]);
        assert_eq!(cents.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn reconciled_gives_cent_to_largest_remainder() {
        let lines = vec![SplitLine::new("Snack", dec("1.00"), vec![1, 2])];
        let alloc = allocate(&lines, &people(&["A", "B"])).unwrap();
        // A owes 0.3333…, B owes 0.6666…
        let rounded = alloc.reconciled().unwrap();
        assert_eq!(rounded[0].1.to_cents(), 33);
        assert_eq!(rounded[1].1.to_cents(), 67);
    }

    #[test]
    fn reconciled_sum_is_exact_over_many_lines() {
        let lines: Vec<SplitLine> = (1..=12)
            .map(|i| SplitLine::new(format!("item{i}"), Decimal::new(100 + i * 7, 2), vec![1, 1, 1]))
            .collect();
        let alloc = allocate(&lines, &people(&["A", "B", "C"])).unwrap();
        let sum: i64 = alloc.reconciled().unwrap().iter().map(|(_, m)| m.to_cents()).sum();
        assert_eq!(sum, Money::from_decimal(alloc.allocated_total).to_cents());
    }

    #[test]
    fn reconciled_is_deterministic() {
        let lines = vec![SplitLine::new("Cake", dec("0.02"), vec![1, 1, 1])];
        let alloc = allocate(&lines, &people(&["A", "B", "C"])).unwrap();
        assert_eq!(alloc.reconciled(), alloc.reconciled());
        let cents: Vec<i64> = alloc.reconciled().unwrap().iter().map(|(_, m)| m.to_cents()).collect();
        assert_eq!(cents, [1, 1, 0]);
    }

    #[test]
    fn reconciled_amount_too_large_for_cents_is_an_overflow() {
        let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let lines = vec![SplitLine::new("Yacht", huge, vec![1])];
        let alloc = allocate(&lines, &people(&["A"])).unwrap();
        assert_eq!(alloc.reconciled(), Err(SplitError::Overflow("A".into())));
    }
}
