//! Provider module for NotesAI
//!
//! This module contains the completion-service abstraction and its
//! implementations for OpenAI-compatible endpoints and Ollama.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{CompletionResponse, Message, Provider, TokenUsage};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::time::Duration;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration; `provider_type` selects the backend
/// * `timeout` - Per-request transport timeout
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
///
/// # Examples
///
/// ```
/// use notesai::config::ProviderConfig;
/// use notesai::providers::{create_provider, Provider};
/// use std::time::Duration;
///
/// let provider = create_provider(&ProviderConfig::default(), Duration::from_secs(30)).unwrap();
/// assert_eq!(provider.name(), "openai");
/// ```
pub fn create_provider(config: &ProviderConfig, timeout: Duration) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(config.openai.clone(), timeout)?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone(), timeout)?)),
        other => Err(crate::error::NotesAiError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}
