use serde::{Deserialize, Serialize};

use crate::types::{Line, Token};

/// How tokens are ordered inside a finished line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrder {
    /// Left to right by the token's left edge.
    #[default]
    Horizontal,
    /// The order tokens joined the line, i.e. by ascending anchor y.
    Insertion,
}

/// An open line: the anchor of its seed token plus everything placed in it.
struct Bucket {
    key: f32,
    tokens: Vec<Token>,
}

/// Groups OCR tokens into reading-order lines by vertical proximity.
#[derive(Debug, Clone, Copy)]
pub struct LineClusterer {
    tolerance: f32,
    order: LineOrder,
}

impl LineClusterer {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance, order: LineOrder::default() }
    }

    pub fn with_order(mut self, order: LineOrder) -> Self {
        self.order = order;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Cluster `tokens` into lines ordered top to bottom.
    ///
    /// Tokens are visited by ascending anchor y (ties keep input order). Each
    /// joins the first open line whose key lies strictly within `tolerance`
    /// of its anchor, or an equal key; otherwise it opens a new line keyed by
    /// its own anchor. Keys never move once a line is opened.
    pub fn cluster(&self, tokens: Vec<Token>) -> Vec<Line> {
        let mut anchored: Vec<(f32, Token)> =
            tokens.into_iter().map(|t| (t.anchor_y(), t)).collect();
        anchored.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Buckets are opened in ascending key order because the input is sorted.
        let mut buckets: Vec<Bucket> = Vec::new();
        for (y, token) in anchored {
            match buckets
                .iter_mut()
                .find(|b| b.key == y || (b.key - y).abs() < self.tolerance)
            {
                Some(bucket) => bucket.tokens.push(token),
                None => buckets.push(Bucket { key: y, tokens: vec![token] }),
            }
        }

        buckets
            .into_iter()
            .map(|mut b| {
                if self.order == LineOrder::Horizontal {
                    b.tokens.sort_by(|l, r| l.left_x().total_cmp(&r.left_x()));
                }
                Line { tokens: b.tokens, anchor_y: b.key }
            })
            .collect()
    }
}
