//! LLM Call primitive.
//!
//! The fundamental AI operation: single-shot inference with optional
//! JSON-object output. Moderation, refinement and ranking are all built on
//! this primitive.

use crate::backend::{LlmBackend, LlmRequest, LlmResponse, TokenUsage};
use crate::error::{AiError, LlmError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::{debug, warn};
use ulid::Ulid;

/// Unique identifier for an LLM invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LlmInvocationId(Ulid);

impl LlmInvocationId {
    /// Creates a new invocation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LlmInvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LlmInvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "llm_{}", self.0)
    }
}

/// The result of an LLM Call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmCallResult {
    /// Unique identifier for this invocation.
    pub id: LlmInvocationId,
    /// The raw text output.
    pub content: String,
    /// Parsed JSON object (if a JSON answer was requested).
    pub structured_output: Option<JsonValue>,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// When the call was made.
    pub timestamp: DateTime<Utc>,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

impl LlmCallResult {
    /// Creates a result from an LLM response.
    #[must_use]
    pub fn from_response(id: LlmInvocationId, response: LlmResponse, latency_ms: u64) -> Self {
        Self {
            id,
            content: response.content,
            structured_output: response.structured_output,
            usage: response.usage,
            model: response.model,
            timestamp: Utc::now(),
            latency_ms,
        }
    }
}

/// An LLM Call executor.
///
/// A builder for a single inference; [`LlmCall::invoke`] runs it against a
/// backend and [`LlmCall::invoke_json`] additionally decodes the answer.
#[derive(Debug, Clone)]
pub struct LlmCall {
    operation: &'static str,
    prompt: String,
    system_prompt: Option<String>,
    json_output: bool,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmCall {
    /// Creates a new LLM Call for the named operation with the given prompt.
    #[must_use]
    pub fn new(operation: &'static str, prompt: impl Into<String>) -> Self {
        Self {
            operation,
            prompt: prompt.into(),
            system_prompt: None,
            json_output: false,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Requests a JSON-object answer.
    #[must_use]
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
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

    /// Builds an LLM request from this configuration.
    #[must_use]
    pub fn build_request(&self) -> LlmRequest {
        let mut request = LlmRequest::new(self.prompt.clone());

        if let Some(ref system) = self.system_prompt {
            request = request.with_system(system.clone());
        }

        if self.json_output {
            request = request.with_json_output();
        }

        if let Some(temp) = self.temperature {
            request = request.with_temperature(temp);
        }

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }

    /// Runs the call against a backend.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Backend`] if the backend call fails.
    pub async fn invoke(&self, backend: &dyn LlmBackend) -> Result<LlmCallResult, AiError> {
        let id = LlmInvocationId::new();
        let request = self.build_request();
        let started = Instant::now();

        match backend.generate(&request).await {
            Ok(response) => {
                let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                debug!(
                    invocation = %id,
                    operation = self.operation,
                    model = %response.model,
                    latency_ms,
                    tokens = response.usage.total(),
                    "LLM call completed"
                );
                Ok(LlmCallResult::from_response(id, response, latency_ms))
            }
            Err(source) => {
                warn!(
                    invocation = %id,
                    operation = self.operation,
                    model = backend.model(),
                    error = %source,
                    "LLM call failed"
                );
                Err(AiError::Backend {
                    invocation_id: id,
                    source,
                })
            }
        }
    }

    /// Runs the call and decodes the JSON answer into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Backend`] if the call fails and
    /// [`AiError::SchemaValidationFailed`] if the answer does not decode.
    pub async fn invoke_json<T: DeserializeOwned>(
        &self,
        backend: &dyn LlmBackend,
    ) -> Result<T, AiError> {
        let result = self.clone().with_json_output().invoke(backend).await?;
        let value = match result.structured_output {
            Some(value) => value,
            None => serde_json::from_str(&result.content).map_err(|e| {
                AiError::SchemaValidationFailed {
                    expected: format!("{} JSON object", self.operation),
                    actual: e.to_string(),
                }
            })?,
        };
        serde_json::from_value(value).map_err(|e| AiError::SchemaValidationFailed {
            expected: format!("{} JSON object", self.operation),
            actual: e.to_string(),
        })
    }
}

/// Maps a missing-content backend response to an error.
pub(crate) fn non_empty(content: &str) -> Result<&str, LlmError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(trimmed)
    }
}
