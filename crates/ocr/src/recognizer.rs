use std::path::Path;

use thiserror::Error;

use crate::types::Token;
use crate::vision::VisionResponse;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR service error: {0}")]
    Collaborator(String),
    #[error("Invalid OCR response: {0}")]
    InvalidResponse(String),
}

/// Abstraction over an OCR service.
///
/// Implementations accept raw image bytes and return the recognized word
/// tokens in service order. Any whole-image text block the service reports is
/// removed by the backend.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<Token>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset tokens, or a preset service error.
pub struct MockRecognizer {
    result: Result<Vec<Token>, String>,
}

impl MockRecognizer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { result: Ok(tokens) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { result: Err(message.into()) }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<Token>, OcrError> {
        self.result.clone().map_err(OcrError::Collaborator)
    }
}

// ── Replay backend ────────────────────────────────────────────────────────────

/// Replays a saved Cloud Vision response instead of calling the service.
pub struct ReplayRecognizer {
    response: Vec<u8>,
}

impl ReplayRecognizer {
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self { response: response.into() }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(tokio::fs::read(path).await?))
    }
}

impl OcrBackend for ReplayRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<Token>, OcrError> {
        VisionResponse::from_json(&self.response)?.into_tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn token(text: &str) -> Token {
        Token::new(text, vec![Point::new(0.0, 0.0)]).unwrap()
    }

    #[test]
    fn mock_returns_preset_tokens() {
        let r = MockRecognizer::new(vec![token("AH"), token("BROOD")]);
        let tokens = r.recognize(b"fake image data").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text(), "BROOD");
    }

    #[test]
    fn mock_failure_is_collaborator_error() {
        let r = MockRecognizer::failing("quota exceeded");
        assert!(matches!(r.recognize(b""), Err(OcrError::Collaborator(m)) if m == "quota exceeded"));
    }

    #[test]
    fn replay_ignores_image_content() {
        let r = ReplayRecognizer::new(r#"{"textAnnotations": []}"#);
        assert!(r.recognize(b"anything").unwrap().is_empty());
        assert!(r.recognize(b"").unwrap().is_empty());
    }

    #[tokio::test]
    async fn replay_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.json");
        std::fs::write(&path, r#"{"error": {"message": "PERMISSION_DENIED"}}"#).unwrap();
        let r = ReplayRecognizer::load(&path).await.unwrap();
        assert!(matches!(r.recognize(b""), Err(OcrError::Collaborator(_))));
    }
}
