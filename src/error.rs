//! Error types for NotesAI
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for NotesAI operations
///
/// This enum encompasses all possible errors that can occur while loading
/// configuration, resolving the caller, reading or writing notes, and
/// talking to the completion service.
#[derive(Error, Debug)]
pub enum NotesAiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No caller identity could be resolved
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Provider-related errors (API calls, malformed payloads, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors from the completion service (401/403)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Completion service rejected the request with 429
    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the provider asked us to wait
        retry_after_secs: u64,
    },

    /// Note storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Note does not exist or is not owned by the caller
    #[error("Note not found: {0}")]
    NoteNotFound(String),
}

impl NotesAiError {
    /// Returns true for failures that happened on the way to or from the
    /// completion service (network, auth, rate limits, bad payloads).
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::error::NotesAiError;
    ///
    /// assert!(NotesAiError::Provider("timeout".to_string()).is_transport_failure());
    /// assert!(!NotesAiError::Unauthorized("no user".to_string()).is_transport_failure());
    /// ```
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Authentication(_) | Self::RateLimited { .. }
        )
    }
}

/// Result type alias for NotesAI operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Use
/// `downcast_ref::<NotesAiError>()` to inspect the failure kind.
pub type Result<T> = anyhow::Result<T>;

/// Returns true when `err` wraps an [`NotesAiError::Unauthorized`]
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<NotesAiError>(),
        Some(NotesAiError::Unauthorized(_))
    )
}

/// Returns true when `err` wraps a completion-service failure
pub fn is_transport_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<NotesAiError>()
        .map(NotesAiError::is_transport_failure)
        .unwrap_or(false)
}
