//! Ollama provider implementation for NotesAI
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server through its `/api/chat` endpoint.

use crate::config::OllamaConfig;
use crate::error::{NotesAiError, Result};
use crate::providers::openai::{retry_after_secs, status_error};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use notesai::config::OllamaConfig;
/// use notesai::providers::{OllamaProvider, Provider, Message};
/// use std::time::Duration;
///
/// # async fn example() -> notesai::error::Result<()> {
/// let config = OllamaConfig {
///     host: "http://localhost:11434".to_string(),
///     model: "llama3.2:latest".to_string(),
/// };
/// let provider = OllamaProvider::new(config, Duration::from_secs(120))?;
/// let completion = provider.complete(&[Message::user("Hello!")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Message structure for Ollama API
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::config::OllamaConfig;
    /// use notesai::providers::OllamaProvider;
    /// use std::time::Duration;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default(), Duration::from_secs(5));
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notesai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotesAiError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        self.config.host.trim_end_matches('/')
    }

    /// Convert messages to Ollama format, skipping ones without content
    fn convert_messages(messages: &[Message]) -> Vec<OllamaMessage> {
        messages
            .iter()
            .filter_map(|m| {
                m.content.as_ref().map(|content| OllamaMessage {
                    role: m.role.clone(),
                    content: content.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }

    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let url = format!("{}/api/chat", self.host());
        let ollama_request = OllamaRequest {
            model: &self.config.model,
            messages: Self::convert_messages(messages),
            stream: false,
        };

        tracing::debug!(
            "Sending Ollama request: {} messages",
            ollama_request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                NotesAiError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(status_error("Ollama", status, retry_after, &error_text).into());
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            NotesAiError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            ollama_response.done,
            ollama_response.prompt_eval_count,
            ollama_response.eval_count
        );

        let message = match ollama_response.message {
            Some(m) if !m.content.is_empty() => Message::assistant(m.content),
            _ => Message::empty_assistant(),
        };

        let response = if ollama_response.prompt_eval_count > 0 || ollama_response.eval_count > 0 {
            let usage = TokenUsage::new(
                ollama_response.prompt_eval_count,
                ollama_response.eval_count,
            );
            CompletionResponse::with_usage(message, usage)
        } else {
            CompletionResponse::new(message)
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_trims_trailing_slash() {
        let provider = OllamaProvider::new(
            OllamaConfig {
                host: "http://localhost:11434/".to_string(),
                model: "llama3.2:latest".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.host(), "http://localhost:11434");
        assert_eq!(provider.model(), "llama3.2:latest");
    }

    #[test]
    fn test_convert_messages_preserves_roles_and_order() {
        let messages = vec![
            Message::system("ctx"),
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
        ];
        let converted = OllamaProvider::convert_messages(&messages);
        let roles: Vec<&str> = converted.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(converted[3].content, "q2");
    }

    #[test]
    fn test_response_without_message_parses() {
        let parsed: OllamaResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(parsed.message.is_none());
        assert!(parsed.done);
    }
}
