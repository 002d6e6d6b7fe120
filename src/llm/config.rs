//! Capability client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Gemini capability client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used for both OCR and translation
    #[serde(default = "default_model")]
    pub model: String,
    /// Generation temperature (server default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens in a response (server default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: None,
            max_output_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `QALAM_ENDPOINT`: API base endpoint
    /// - `QALAM_MODEL`: Model name
    /// - `QALAM_TEMPERATURE`: Generation temperature
    /// - `QALAM_MAX_OUTPUT_TOKENS`: Maximum tokens in response
    /// - `QALAM_TIMEOUT_SECS`: Request timeout
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("QALAM_ENDPOINT") {
            self.endpoint = val;
        }
        if let Some(val) = lookup("QALAM_MODEL") {
            self.model = val;
        }
        if let Some(t) = lookup("QALAM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = Some(t);
        }
        if let Some(n) = lookup("QALAM_MAX_OUTPUT_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_output_tokens = Some(n);
        }
        if let Some(n) = lookup("QALAM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// URL of the configured model resource.
    pub fn model_url(&self) -> String {
        format!("{}/models/{}", self.endpoint.trim_end_matches('/'), self.model)
    }

    /// URL of the `generateContent` method for the configured model.
    pub fn generate_url(&self) -> String {
        format!("{}:generateContent", self.model_url())
    }
}
