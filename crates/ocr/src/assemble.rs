use bonsplit_core::money::round_cents;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::filter::drop_quantity_only;
use crate::types::ProductRecord;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// The structured receipt handed to presentation and storage.
///
/// `total_items` and `total_amount` are derived from `products` and are
/// recomputed by every method that changes the product list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptDocument {
    timestamp: DateTime<Utc>,
    total_items: usize,
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    currency: String,
    products: Vec<ProductRecord>,
}

impl ReceiptDocument {
    pub fn new(products: Vec<ProductRecord>, currency: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let mut doc = Self {
            timestamp,
            total_items: 0,
            total_amount: Decimal::ZERO,
            currency: currency.into(),
            products,
        };
        doc.recompute();
        doc
    }

    /// Extracted prices are bounded by [`bonsplit_core::MAX_AMOUNT`]; a sum
    /// that still leaves the range of [`Decimal`] saturates.
    fn recompute(&mut self) {
        self.total_items = self.products.len();
        let sum = self
            .products
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.price))
            .unwrap_or_else(|| {
                tracing::warn!(products = self.products.len(), "receipt total out of range");
                if self.products.iter().any(|p| p.price.is_sign_positive()) {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                }
            });
        self.total_amount = round_cents(sum);
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&ProductRecord) -> bool,
    {
        self.products.retain(f);
        self.recompute();
    }

    /// Sum the prices of products sharing a name, in first-seen order.
    pub fn aggregated(&self) -> Vec<(String, Decimal)> {
        let mut out: Vec<(String, Decimal)> = Vec::new();
        for p in &self.products {
            match out.iter_mut().find(|(name, _)| *name == p.name) {
                Some((_, total)) => *total += p.price,
                None => out.push((p.name.clone(), p.price)),
            }
        }
        out
    }
}

/// Builds a [`ReceiptDocument`] from extracted records.
#[derive(Debug, Clone)]
pub struct ReceiptAssembler {
    currency: String,
    quantity_filter: bool,
}

impl Default for ReceiptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

impl ReceiptAssembler {
    /// An assembler that drops quantity-only records.
    pub fn new(currency: impl Into<String>) -> Self {
        Self { currency: currency.into(), quantity_filter: true }
    }

    /// An assembler that keeps every record it is given.
    pub fn unfiltered(currency: impl Into<String>) -> Self {
        Self { currency: currency.into(), quantity_filter: false }
    }

    pub fn assemble(&self, records: &[ProductRecord]) -> ReceiptDocument {
        self.assemble_at(records, Utc::now())
    }

    pub fn assemble_at(&self, records: &[ProductRecord], timestamp: DateTime<Utc>) -> ReceiptDocument {
        let products = if self.quantity_filter {
            let (kept, dropped) = drop_quantity_only(records);
            if !dropped.is_empty() {
                tracing::info!(count = dropped.len(), "filtered quantity-only lines");
            }
            kept
        } else {
            records.to_vec()
        };
        ReceiptDocument::new(products, self.currency.clone(), timestamp)
    }
}
