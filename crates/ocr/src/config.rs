use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assemble::DEFAULT_CURRENCY;
use crate::cluster::{LineClusterer, LineOrder};
use crate::extract::{NameOrder, ProductExtractor};
use crate::filter::KeywordFilter;

/// Substrings marking non-product lines on Dutch supermarket receipts:
/// totals, tax, payment, change, deposits and bonus boxes, currency codes and
/// per-kilo weight lines.
pub const DEFAULT_IGNORE_KEYWORDS: &[&str] = &[
    "totaal", "betaald", "korting", "btw", "subtotal", "change", "wisselgeld", "pinnen",
    "emballage", "box", "voordeel", "total", "bankpas", "cash", "eur", " kg",
];

/// Pixel distance within which tokens are considered to share a row.
pub const DEFAULT_TOLERANCE: f32 = 15.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Line tolerance must be a finite, non-negative number, got {0}")]
    InvalidTolerance(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tolerance: f32,
    pub ignore_keywords: Vec<String>,
    pub name_order: NameOrder,
    pub line_order: LineOrder,
    pub currency: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            ignore_keywords: DEFAULT_IGNORE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            name_order: NameOrder::default(),
            line_order: LineOrder::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    pub fn clusterer(&self) -> LineClusterer {
        LineClusterer::new(self.tolerance).with_order(self.line_order)
    }

    pub fn extractor(&self) -> ProductExtractor {
        ProductExtractor::new(KeywordFilter::new(&self.ignore_keywords), self.name_order)
    }
}
