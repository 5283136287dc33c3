//! Base provider trait and common types for NotesAI
//!
//! This module defines the Provider trait that every completion backend
//! implements, along with the wire-level message and response types.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for a completion request
///
/// Uses the role names shared by chat-completion APIs
/// (`system`, `user`, `assistant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::providers::Message;
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::providers::Message;
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
        }
    }

    /// Creates an assistant message without content
    ///
    /// Providers return this when the service answered without any text.
    pub fn empty_assistant() -> Self {
        Self {
            role: "assistant".to_string(),
            content: None,
        }
    }

    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::providers::Message;
    ///
    /// let msg = Message::system("You are a helpful assistant");
    /// assert_eq!(msg.role, "system");
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Token usage information from a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with message and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The first choice returned by the service; `content` is `None`
    /// when the service produced no text
    pub message: Message,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::providers::{CompletionResponse, Message};
    ///
    /// let response = CompletionResponse::new(Message::assistant("Hello!"));
    /// assert!(response.usage.is_none());
    /// ```
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }

    /// Text of the answer, if the service produced any
    pub fn text(&self) -> Option<&str> {
        self.message.content.as_deref()
    }
}

/// Provider trait for completion services
///
/// Each call is a single attempt: implementations never retry, and a
/// dropped future abandons the in-flight HTTP request.
///
/// # Examples
///
/// ```no_run
/// use notesai::providers::{Provider, Message, CompletionResponse};
/// use notesai::error::Result;
/// use async_trait::async_trait;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl Provider for MyProvider {
///     fn name(&self) -> &str {
///         "mine"
///     }
///
///     fn model(&self) -> String {
///         "my-model".to_string()
///     }
///
///     async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(Message::assistant("Response")))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name used in logs (e.g. "openai", "ollama")
    fn name(&self) -> &str;

    /// Model identifier sent with each request
    fn model(&self) -> String;

    /// Completes a conversation with the given messages
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent, the service rejects it,
    /// or the response body cannot be parsed
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse>;
}
