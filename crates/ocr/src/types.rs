use bonsplit_core::SplitLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A vertex of a token's bounding polygon, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognized word and the polygon it was found in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    text: String,
    polygon: Vec<Point>,
}

impl Token {
    /// Returns `None` for empty text or a polygon without vertices.
    pub fn new(text: impl Into<String>, polygon: Vec<Point>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() || polygon.is_empty() {
            return None;
        }
        Some(Self { text, polygon })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Mean y of the polygon's vertices.
    pub fn anchor_y(&self) -> f32 {
        self.polygon.iter().map(|p| p.y).sum::<f32>() / self.polygon.len() as f32
    }

    /// Left edge of the polygon.
    pub fn left_x(&self) -> f32 {
        self.polygon.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }
}

/// Tokens believed to share one printed row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub tokens: Vec<Token>,
    /// Anchor of the token that opened the line.
    pub anchor_y: f32,
}

impl Line {
    pub fn text(&self) -> String {
        self.tokens.iter().map(Token::text).collect::<Vec<_>>().join(" ")
    }
}

/// A product name and price read from a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// The line the record came from, kept for diagnostics.
    #[serde(skip)]
    pub source_line: String,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>, price: Decimal, source_line: impl Into<String>) -> Self {
        Self { name: name.into(), price, source_line: source_line.into() }
    }

    /// Discounts and bonus lines are printed with a negative amount.
    pub fn is_discount(&self) -> bool {
        self.price.is_sign_negative() && !self.price.is_zero()
    }

    pub fn into_split_line(self, weights: Vec<u32>) -> SplitLine {
        SplitLine::new(self.name, self.price, weights)
    }
}
