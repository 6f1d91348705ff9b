use serde::{Deserialize, Serialize};

use crate::filter::{KeywordFilter, SkipReason, SkippedLine};
use crate::price::find_price;
use crate::types::{Line, ProductRecord};

/// How the words left over after removing the price form the product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameOrder {
    /// Keep the printed word order.
    #[default]
    Original,
    /// Sort words case-insensitively.
    Alphabetical,
}

/// Records extracted from a receipt together with the lines that were passed over.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<ProductRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct ProductExtractor {
    keywords: KeywordFilter,
    name_order: NameOrder,
}

impl ProductExtractor {
    pub fn new(keywords: KeywordFilter, name_order: NameOrder) -> Self {
        Self { keywords, name_order }
    }

    /// Turn one line of receipt text into a product record.
    ///
    /// Stages run in order: ignore keywords, price required, non-empty name.
    pub fn extract(&self, line: &str) -> Result<ProductRecord, SkipReason> {
        if let Some(keyword) = self.keywords.matched(line) {
            return Err(SkipReason::IgnoredKeyword(keyword.to_string()));
        }

        let price = find_price(line).ok_or(SkipReason::NoPrice)?;

        let mut words: Vec<&str> = line.split_whitespace().collect();
        // A price glued to other characters stays part of the name.
        if let Some(pos) = words.iter().position(|w| *w == price.span) {
            words.remove(pos);
        }

        if self.name_order == NameOrder::Alphabetical {
            words.sort_by_key(|w| w.to_lowercase());
        }

        let name = words.join(" ").trim().to_string();
        if name.is_empty() {
            return Err(SkipReason::EmptyName);
        }

        Ok(ProductRecord::new(name, price.amount, line))
    }

    /// Extract every line, keeping line order.
    pub fn extract_lines(&self, lines: &[Line]) -> Extraction {
        let mut extraction = Extraction::default();
        for line in lines {
            let text = line.text();
            match self.extract(&text) {
                Ok(record) => extraction.records.push(record),
                Err(reason) => {
                    tracing::debug!(line = %text, %reason, "line skipped");
                    extraction.skipped.push(SkippedLine { line: text, reason });
                }
            }
        }
        extraction
    }
}
