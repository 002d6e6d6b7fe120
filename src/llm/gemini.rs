//! Google Gemini client implementing OCR and translation.
//!
//! Both capabilities go through the `generateContent` method of the same
//! model. The client is built once with the API key and shared by reference.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::LlmConfig;
use super::prompts;
use super::{CapabilityError, LlmError, TextRecognizer, Translator};
use crate::config::{ApiKey, ConfigError};
use crate::utils::encoding::EncodedPayload;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
pub struct GeminiClient {
    config: LlmConfig,
    api_key: ApiKey,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Model metadata returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub input_token_limit: Option<u64>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String, LlmError> {
        if let Some(error) = self.error {
            return Err(LlmError::Rejected(error.message));
        }

        let candidate = match self.candidates.and_then(|c| c.into_iter().next()) {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("prompt blocked: {}", r))
                    .unwrap_or_else(|| "response contained no candidates".to_string());
                return Err(LlmError::Parse(reason));
            }
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if texts.is_empty() {
            return Err(LlmError::Parse(
                "candidate contained no text parts".to_string(),
            ));
        }
        Ok(texts.concat())
    }
}

impl GeminiClient {
    /// Create a client bound to the given API key.
    pub fn new(config: LlmConfig, api_key: ApiKey) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Fetch metadata for the configured model. Verifies the key and model name.
    pub async fn model_info(&self) -> Result<ModelInfo, LlmError> {
        let resp = self
            .client
            .get(self.config.model_url())
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        resp.json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.config.temperature.is_none() && self.config.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        })
    }

    /// Call `generateContent` with the given parts.
    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: self.generation_config(),
        };

        let resp = self
            .client
            .post(self.config.generate_url())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let response: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        response.into_text()
    }
}

#[async_trait]
impl TextRecognizer for GeminiClient {
    async fn extract_text(
        &self,
        payload: &EncodedPayload,
        instruction: &str,
    ) -> Result<String, CapabilityError> {
        info!(
            "Extracting text via {} ({}, {} base64 chars)",
            self.config.model,
            payload.mime,
            payload.data.len()
        );

        let parts = vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: payload.mime.as_str(),
                    data: &payload.data,
                },
            },
            Part::Text { text: instruction },
        ];

        let text = self.generate(parts).await.map_err(CapabilityError::ocr)?;
        debug!("OCR returned {} chars", text.chars().count());
        Ok(text)
    }
}

#[async_trait]
impl Translator for GeminiClient {
    async fn translate(&self, source_text: &str) -> Result<String, CapabilityError> {
        info!(
            "Translating {} chars via {}",
            source_text.chars().count(),
            self.config.model
        );

        let prompt = prompts::translation_prompt(source_text);
        let text = self
            .generate(vec![Part::Text { text: &prompt }])
            .await
            .map_err(CapabilityError::translation)?;
        debug!("Translation returned {} chars", text.chars().count());
        Ok(text)
    }
}
