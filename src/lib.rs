//! NotesAI - note-grounded question answering library
//!
//! This library turns a user's free-text notes into a single context
//! message, folds the caller's conversation history on top of it, and asks
//! an LLM completion service for an answer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `context`: Note corpus formatting (HTML or plain text)
//! - `conversation`: Conversation history normalization and message assembly
//! - `gateway`: Single-attempt completion transport and answer sanitization
//! - `service`: The orchestrator and note actions
//! - `providers`: Completion service abstraction (OpenAI-compatible, Ollama)
//! - `storage`: Note persistence (SQLite, in-memory)
//! - `auth`: Caller identity resolution
//! - `prompts`: Persona preamble for the context message
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use notesai::{commands, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let service = commands::build_service(&config)?;
//!     let answer = service
//!         .ask_about_notes(&["What are my open risks?"], &[] as &[&str])
//!         .await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod prompts;
pub mod providers;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use auth::{Identity, IdentityResolver, StaticIdentityResolver};
pub use config::Config;
pub use context::{ContextFormat, NoteContextFormatter};
pub use conversation::{ConversationAssembler, ConversationHistory, ConversationMessage};
pub use error::{NotesAiError, Result};
pub use gateway::{Answer, AnswerSource, CompletionGateway, MALFORMED_RESPONSE_FALLBACK};
pub use service::{NotesAiService, EMPTY_CORPUS_MESSAGE, TRANSPORT_FAILURE_FALLBACK};
pub use storage::{Note, NoteStore};
