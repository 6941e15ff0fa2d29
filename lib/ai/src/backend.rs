//! LLM backend abstraction.
//!
//! Provides a unified interface over chat-completion providers. Every
//! language-model collaborator of the recommendation flow (moderation,
//! refinement, ranking) talks to a backend only through [`LlmBackend`].

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// OpenAI API.
    OpenAi,
    /// Generic OpenAI-compatible API.
    OpenAiCompatible,
}

impl LlmProvider {
    /// Returns the provider name used in logs and errors.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenAiCompatible => "openai_compatible",
        }
    }
}

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an LLM backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBackendConfig {
    /// The provider type.
    pub provider: LlmProvider,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// API key (if required).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl LlmBackendConfig {
    /// Creates a new OpenAI backend configuration.
    #[must_use]
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            api_key: Some(api_key.into()),
            timeout_secs: 30,
        }
    }

    /// Points the backend at a different base URL.
    ///
    /// Anything other than the public OpenAI endpoint is treated as an
    /// OpenAI-compatible provider.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if base_url.trim_end_matches('/') != OPENAI_BASE_URL {
            self.provider = LlmProvider::OpenAiCompatible;
        }
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// How the model should format its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// A request to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The user message to send.
    pub prompt: String,
    /// System prompt, if any.
    pub system: Option<String>,
    /// Requested output format.
    pub response_format: ResponseFormat,
    /// Temperature for sampling (0.0 - 2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// Creates a new simple request with just a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            response_format: ResponseFormat::Text,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Requests a JSON-object answer.
    #[must_use]
    pub fn with_json_output(mut self) -> Self {
        self.response_format = ResponseFormat::JsonObject;
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Returns true if a JSON-object answer was requested.
    #[must_use]
    pub fn wants_json(&self) -> bool {
        self.response_format == ResponseFormat::JsonObject
    }
}

/// A response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated content.
    pub content: String,
    /// Parsed JSON object (if a JSON answer was requested).
    pub structured_output: Option<JsonValue>,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for LLM backends.
///
/// This trait defines the interface that all LLM providers must implement.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM call fails.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Returns the provider type.
    fn provider(&self) -> LlmProvider;

    /// Returns the model name.
    fn model(&self) -> &str;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend shared by the unit tests of this crate.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns queued replies in order and records every request it sees.
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(content: &str) -> Self {
            Self::new(vec![Ok(content.to_string())])
        }

        pub fn failing(error: LlmError) -> Self {
            Self::new(vec![Err(error)])
        }

        pub fn last_request(&self) -> LlmRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request recorded")
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))?;
            let structured_output = if request.wants_json() {
                Some(serde_json::from_str(&content).map_err(|e| {
                    LlmError::ResponseParseFailed {
                        reason: e.to_string(),
                    }
                })?)
            } else {
                None
            };
            Ok(LlmResponse {
                content,
                structured_output,
                usage: TokenUsage::default(),
                model: "scripted".to_string(),
            })
        }

        fn provider(&self) -> LlmProvider {
            LlmProvider::OpenAiCompatible
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_request_builder() {
        let request = LlmRequest::new("User's initial request: tapas")
            .with_system("You refine search queries.")
            .with_json_output()
            .with_temperature(0.0)
            .with_max_tokens(5);

        assert_eq!(request.prompt, "User's initial request: tapas");
        assert_eq!(request.system, Some("You refine search queries.".to_string()));
        assert!(request.wants_json());
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(5));
    }

    #[test]
    fn plain_request_is_text() {
        assert!(!LlmRequest::new("hi").wants_json());
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn custom_base_url_switches_provider() {
        let config = LlmBackendConfig::openai("sk-test", "gpt-4o-mini");
        assert_eq!(config.provider, LlmProvider::OpenAi);

        let same = config.clone().with_base_url("https://api.openai.com/v1/");
        assert_eq!(same.provider, LlmProvider::OpenAi);

        let local = config.with_base_url("http://localhost:8080/v1");
        assert_eq!(local.provider, LlmProvider::OpenAiCompatible);
    }

    #[test]
    fn backend_config_serde() {
        let config = LlmBackendConfig::openai("sk-test", "gpt-4o-mini").with_timeout_secs(12);
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: LlmBackendConfig = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(config.provider, parsed.provider);
        assert_eq!(config.model, parsed.model);
        assert_eq!(parsed.timeout_secs, 12);
    }
}
