//! Decoding of Google Cloud Vision `TEXT_DETECTION` responses.
//!
//! Vision omits zero-valued fields, so every field is defaulted. The first
//! text annotation is the whole-image text block; the rest are single words.
//! Only the words become tokens.

use serde::Deserialize;

use crate::recognizer::OcrError;
use crate::types::{Point, Token};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionResponse {
    #[serde(default, alias = "text_annotations")]
    pub text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "bounding_poly")]
    pub bounding_poly: BoundingPoly,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Batch { responses: Vec<VisionResponse> },
    Single(VisionResponse),
}

impl VisionResponse {
    /// Parse a single response or the first entry of a batch response.
    pub fn from_json(data: &[u8]) -> Result<Self, OcrError> {
        let envelope: Envelope =
            serde_json::from_slice(data).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;
        match envelope {
            Envelope::Batch { responses } => responses
                .into_iter()
                .next()
                .ok_or_else(|| OcrError::InvalidResponse("empty batch response".to_string())),
            Envelope::Single(response) => Ok(response),
        }
    }

    /// Convert the word annotations into tokens, in response order.
    ///
    /// The whole-image block at index 0 is removed before annotations without
    /// text or polygon are dropped, so a malformed block never costs a word.
    /// A non-empty error message fails the whole response.
    pub fn into_tokens(self) -> Result<Vec<Token>, OcrError> {
        if let Some(status) = self.error.filter(|s| !s.message.is_empty()) {
            return Err(OcrError::Collaborator(status.message));
        }

        let mut tokens = Vec::with_capacity(self.text_annotations.len().saturating_sub(1));
        for annotation in self.text_annotations.into_iter().skip(1) {
            let polygon = annotation
                .bounding_poly
                .vertices
                .iter()
                .map(|v| Point::new(v.x, v.y))
                .collect();
            match Token::new(annotation.description, polygon) {
                Some(token) => tokens.push(token),
                None => tracing::debug!("dropping annotation without text or polygon"),
            }
        }
        Ok(tokens)
    }
}
