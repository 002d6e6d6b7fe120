//! Remote text-generation capabilities used by the pipeline.
//!
//! Two operations are exposed as traits so the orchestrator can run against
//! any implementation:
//! - [`TextRecognizer`]: OCR over an encoded image
//! - [`Translator`]: Arabic-to-English translation
//!
//! [`GeminiClient`] implements both against Google's `generateContent` API.
//! Neither operation retries; a failed call yields no text.

mod config;
mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::utils::encoding::EncodedPayload;

pub use config::LlmConfig;
pub use gemini::GeminiClient;

/// Which capability an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Ocr,
    Translation,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Ocr => "ocr",
            Capability::Translation => "translation",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur talking to the model API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect or the request timed out
    #[error("Connection error: {0}")]
    Connection(String),

    /// API returned a non-success status
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// API reported an error in the response body
    #[error("API error: {0}")]
    Rejected(String),

    /// Response could not be parsed or carried no text
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A failed capability invocation, tagged with the step that failed.
#[derive(Debug, Error)]
#[error("{capability} request failed: {source}")]
pub struct CapabilityError {
    pub capability: Capability,
    #[source]
    pub source: LlmError,
}

impl CapabilityError {
    pub fn new(capability: Capability, source: LlmError) -> Self {
        Self { capability, source }
    }

    pub fn ocr(source: LlmError) -> Self {
        Self::new(Capability::Ocr, source)
    }

    pub fn translation(source: LlmError) -> Self {
        Self::new(Capability::Translation, source)
    }
}

/// Extracts text from an encoded image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn extract_text(
        &self,
        payload: &EncodedPayload,
        instruction: &str,
    ) -> Result<String, CapabilityError>;
}

/// Translates Arabic text into English, returning only the translation.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, source_text: &str) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_display() {
        let err = CapabilityError::translation(LlmError::Api {
            status: 403,
            body: "permission denied".to_string(),
        });
        assert_eq!(err.capability, Capability::Translation);
        assert_eq!(
            err.to_string(),
            "translation request failed: API error (HTTP 403): permission denied"
        );
    }
}
