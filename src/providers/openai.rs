//! OpenAI-compatible provider implementation for NotesAI
//!
//! Talks to any endpoint exposing `/chat/completions` in the OpenAI shape
//! (DeepSeek, OpenAI, OpenRouter, vLLM, ...). Defaults point at DeepSeek.

use crate::config::OpenAiConfig;
use crate::error::{NotesAiError, Result};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seconds to wait after a 429 when the service sends no `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// OpenAI-compatible chat completion provider
///
/// # Examples
///
/// ```no_run
/// use notesai::config::OpenAiConfig;
/// use notesai::providers::{OpenAiProvider, Provider, Message};
/// use std::time::Duration;
///
/// # async fn example() -> notesai::error::Result<()> {
/// let provider = OpenAiProvider::new(OpenAiConfig::default(), Duration::from_secs(60))?;
/// let response = provider.complete(&[Message::user("Hello!")]).await?;
/// println!("{:?}", response.text());
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    api_key: Option<String>,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// The API key is read from the config or, failing that, from the
    /// environment variable named by `api_key_env`. A missing key is not an
    /// error here; the service will answer 401 and the call fails then.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::config::OpenAiConfig;
    /// use notesai::providers::{OpenAiProvider, Provider};
    /// use std::time::Duration;
    ///
    /// let provider = OpenAiProvider::new(OpenAiConfig::default(), Duration::from_secs(30)).unwrap();
    /// assert_eq!(provider.model(), "deepseek-chat");
    /// ```
    pub fn new(config: OpenAiConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notesai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotesAiError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(&config.api_key_env).ok())
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            tracing::debug!(
                "No API key configured for {} (checked {})",
                config.api_base,
                config.api_key_env
            );
        }

        tracing::info!(
            "Initialized OpenAI-compatible provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Configured API base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base())
    }

    fn convert_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
        messages
            .iter()
            .filter_map(|m| {
                m.content.as_deref().map(|content| ApiMessage {
                    role: m.role.as_str(),
                    content,
                })
            })
            .collect()
    }
}

/// Map a non-success status to the error taxonomy
pub(crate) fn status_error(
    provider: &str,
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
) -> NotesAiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotesAiError::Authentication(format!(
            "{} rejected credentials ({}): {}",
            provider, status, body
        )),
        StatusCode::TOO_MANY_REQUESTS => NotesAiError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => NotesAiError::Provider(format!("{} returned error {}: {}", provider, status, body)),
    }
}

pub(crate) fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }

    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: Self::convert_messages(messages),
            stream: false,
        };

        tracing::debug!(
            "Sending completion request: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Completion request failed: {}", e);
            NotesAiError::Provider(format!("Completion request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(&response);
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion service returned error {}: {}", status, error_text);
            return Err(status_error("Completion service", status, retry_after, &error_text).into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            NotesAiError::Provider(format!("Failed to parse completion response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        if content.is_none() {
            tracing::warn!("Completion response contained no content");
        }

        let message = match content {
            Some(text) => Message::assistant(text),
            None => Message::empty_assistant(),
        };

        Ok(match body.usage {
            Some(usage) => {
                tracing::debug!(
                    "Completion usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                CompletionResponse::with_usage(
                    message,
                    TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
                )
            }
            None => CompletionResponse::new(message),
        })
    }
}
