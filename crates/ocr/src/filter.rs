//! Named filter stages that decide which lines and records become products.
//!
//! Line stages run inside [`ProductExtractor`](crate::ProductExtractor) in the
//! order they are listed in [`FilterStage`]; the record stage
//! [`FilterStage::QuantityOnly`] runs in
//! [`ReceiptAssembler`](crate::ReceiptAssembler) unless the caller opts out.

use std::fmt;

use crate::types::ProductRecord;

re!(re_quantity_expr, r"^\s*\d+\s*[xX×*]\s*\d*[.,]?\d*\s*$");
re!(re_bare_count, r"^\s*\d+\s*$");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
    /// The line contains a configured keyword (totals, tax, change, …).
    IgnoreKeywords,
    /// The line has no amount.
    PriceRequired,
    /// Nothing is left of the line once the amount is taken out.
    NonEmptyName,
    /// The name is only a count or a "count × unit price" expression.
    QuantityOnly,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::IgnoreKeywords => write!(f, "ignore_keywords"),
            FilterStage::PriceRequired => write!(f, "price_required"),
            FilterStage::NonEmptyName => write!(f, "non_empty_name"),
            FilterStage::QuantityOnly => write!(f, "quantity_only"),
        }
    }
}

/// Why a line did not produce a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    IgnoredKeyword(String),
    NoPrice,
    EmptyName,
    QuantityOnly,
}

impl SkipReason {
    pub fn stage(&self) -> FilterStage {
        match self {
            SkipReason::IgnoredKeyword(_) => FilterStage::IgnoreKeywords,
            SkipReason::NoPrice => FilterStage::PriceRequired,
            SkipReason::EmptyName => FilterStage::NonEmptyName,
            SkipReason::QuantityOnly => FilterStage::QuantityOnly,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::IgnoredKeyword(k) => write!(f, "contains ignored keyword '{k}'"),
            SkipReason::NoPrice => write!(f, "no price"),
            SkipReason::EmptyName => write!(f, "no product name"),
            SkipReason::QuantityOnly => write!(f, "quantity only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line: String,
    pub reason: SkipReason,
}

/// Case-insensitive substring matcher over a fixed keyword set.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The first keyword found anywhere in the lowercased line.
    pub fn matched(&self, line: &str) -> Option<&str> {
        let lower = line.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Whether a product name is only a count (`"3"`) or a quantity expression
/// such as `"2 x 1,16"`, `"3X"` or `"4 * 0.99"`.
pub fn is_quantity_only(name: &str) -> bool {
    re_quantity_expr().is_match(name) || re_bare_count().is_match(name)
}

/// Split records into those that name a product and those that are only a
/// quantity expression.
pub fn drop_quantity_only(records: &[ProductRecord]) -> (Vec<ProductRecord>, Vec<SkippedLine>) {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();
    for record in records {
        if is_quantity_only(record.name.trim()) {
            dropped.push(SkippedLine {
                line: record.source_line.clone(),
                reason: SkipReason::QuantityOnly,
            });
        } else {
            kept.push(record.clone());
        }
    }
    (kept, dropped)
}
