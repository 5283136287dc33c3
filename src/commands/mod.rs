/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `ask`  : Answer one question (with optional earlier turns)
- `chat` : Interactive conversation about the caller's notes
- `notes`: Create, edit, delete, list and show notes

All handlers share [`build_service`], which wires the configured
provider, note store and identity into a [`NotesAiService`].
*/

use crate::auth::StaticIdentityResolver;
use crate::config::Config;
use crate::context::NoteContextFormatter;
use crate::conversation::ConversationAssembler;
use crate::error::Result;
use crate::gateway::{AnswerSanitizer, CompletionGateway};
use crate::providers::{create_provider, Provider};
use crate::service::NotesAiService;
use crate::storage::{NoteStore, SqliteNoteStore};
use std::sync::Arc;

pub mod ask;
pub mod chat;
pub mod notes;

// Special commands parser for the chat session
pub mod special_commands;

/// Build the service from configuration, using the SQLite note store
///
/// # Errors
///
/// Returns error if the provider cannot be created or the database cannot
/// be opened
pub fn build_service(config: &Config) -> Result<NotesAiService> {
    let store: Arc<dyn NoteStore> = match &config.storage.db_path {
        Some(path) => Arc::new(SqliteNoteStore::new_with_path(path)?),
        None => Arc::new(SqliteNoteStore::new()?),
    };
    build_service_with_store(config, store)
}

/// Build the service from configuration around an existing store
pub fn build_service_with_store(
    config: &Config,
    store: Arc<dyn NoteStore>,
) -> Result<NotesAiService> {
    let provider: Arc<dyn Provider> =
        Arc::from(create_provider(&config.provider, config.assistant.timeout())?);

    let mut gateway = CompletionGateway::new(provider);
    if config.assistant.sanitize_answers {
        gateway = gateway.with_sanitizer(AnswerSanitizer::new()?);
    }

    let format = config.assistant.context_format;
    tracing::debug!(
        provider = %config.provider.provider_type,
        model = %config.active_model(),
        format = %format,
        sanitize = config.assistant.sanitize_answers,
        "Building notes service"
    );

    Ok(NotesAiService::new(
        Arc::new(StaticIdentityResolver::from_user_id(
            config.identity.user_id.clone(),
        )),
        store,
        NoteContextFormatter::new(format),
        ConversationAssembler::new(format),
        gateway,
    ))
}
