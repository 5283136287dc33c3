//! Note-grounded question answering
//!
//! [`NotesAiService`] runs one stateless invocation per call:
//! authorize, load the caller's notes, short-circuit on an empty corpus,
//! format, assemble, complete. The caller supplies the full conversation
//! history every time.
//!
//! The service also owns the note actions (create, update, delete, list)
//! so that every read and write goes through the same identity check.

use crate::auth::{Identity, IdentityResolver};
use crate::context::NoteContextFormatter;
use crate::conversation::{ConversationAssembler, ConversationHistory};
use crate::error::{is_transport_failure, NotesAiError, Result};
use crate::gateway::{Answer, AnswerSource, CompletionGateway};
use crate::storage::{Note, NoteStore};
use chrono::Utc;
use std::sync::Arc;

/// Answer returned when the caller owns no notes
pub const EMPTY_CORPUS_MESSAGE: &str = "You don't have any notes yet.";

/// Answer returned by [`NotesAiService::ask_about_notes`] when the
/// completion service could not be reached or refused the request
pub const TRANSPORT_FAILURE_FALLBACK: &str =
    "The assistant is unavailable right now. Please try again later.";

/// Orchestrates the note pipeline for one authenticated caller at a time
pub struct NotesAiService {
    identity: Arc<dyn IdentityResolver>,
    store: Arc<dyn NoteStore>,
    formatter: NoteContextFormatter,
    assembler: ConversationAssembler,
    gateway: CompletionGateway,
}

impl NotesAiService {
    /// Wire the service from its collaborators
    ///
    /// `formatter` and `assembler` should use the same
    /// [`crate::context::ContextFormat`] so the preamble matches the corpus.
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        store: Arc<dyn NoteStore>,
        formatter: NoteContextFormatter,
        assembler: ConversationAssembler,
        gateway: CompletionGateway,
    ) -> Self {
        Self {
            identity,
            store,
            formatter,
            assembler,
            gateway,
        }
    }

    /// Model identifier used for completions
    pub fn model(&self) -> String {
        self.gateway.model()
    }

    fn authorize(&self, action: &str) -> Result<Identity> {
        match self.identity.resolve_caller() {
            Some(identity) => {
                tracing::debug!(user = %identity.user_id, action, "Caller authorized");
                Ok(identity)
            }
            None => {
                tracing::warn!(action, "Rejected unauthenticated caller");
                Err(NotesAiError::Unauthorized(format!("You must be logged in to {}", action)).into())
            }
        }
    }

    /// Answer the newest question using the caller's notes
    ///
    /// `questions` and `responses` are parallel; `responses[i]` answers
    /// `questions[i]`. Surplus responses are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` before touching storage when no caller is
    /// signed in, storage errors from loading notes, and any completion
    /// transport failure unchanged.
    pub async fn ask<Q, A>(&self, questions: &[Q], responses: &[A]) -> Result<String>
    where
        Q: AsRef<str> + Sync,
        A: AsRef<str> + Sync,
    {
        Ok(self.answer(questions, responses).await?.text)
    }

    async fn answer<Q, A>(&self, questions: &[Q], responses: &[A]) -> Result<Answer>
    where
        Q: AsRef<str> + Sync,
        A: AsRef<str> + Sync,
    {
        let identity = self.authorize("ask the AI assistant")?;

        let notes = self.store.list_notes(&identity.user_id).await?;
        tracing::debug!(user = %identity.user_id, notes = notes.len(), "Loaded notes");

        if notes.is_empty() {
            tracing::info!(user = %identity.user_id, "Empty corpus; skipping completion");
            return Ok(Answer::fallback(
                AnswerSource::EmptyCorpus,
                EMPTY_CORPUS_MESSAGE,
            ));
        }

        let history = ConversationHistory::from_parallel(questions, responses);
        if history.pending_question().is_none() {
            tracing::debug!(
                turns = history.len(),
                "No unanswered question; the model continues from the last turn"
            );
        }
        let formatted = self.formatter.format_notes(&notes);
        let messages = self.assembler.assemble(&formatted, &history);

        tracing::info!(
            user = %identity.user_id,
            notes = notes.len(),
            turns = history.len(),
            dropped_answers = history.dropped_answers(),
            messages = messages.len(),
            "Requesting answer"
        );

        let answer = self.gateway.complete(&messages).await?;
        tracing::info!(user = %identity.user_id, source = ?answer.source, "Answered");
        Ok(answer)
    }

    /// Public entry point: like [`Self::ask`] but never fails on the
    /// completion transport
    ///
    /// # Errors
    ///
    /// Only `Unauthorized` and storage failures are returned as errors.
    /// Transport failures are logged and replaced with
    /// [`TRANSPORT_FAILURE_FALLBACK`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(service: notesai::service::NotesAiService) -> notesai::error::Result<()> {
    /// let answer = service
    ///     .ask_about_notes(&["What did I write about Q1?"], &[] as &[&str])
    ///     .await?;
    /// println!("{}", answer);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ask_about_notes<Q, A>(&self, questions: &[Q], responses: &[A]) -> Result<String>
    where
        Q: AsRef<str> + Sync,
        A: AsRef<str> + Sync,
    {
        Ok(self.answer_about_notes(questions, responses).await?.text)
    }

    /// Like [`Self::ask_about_notes`] but keeps the answer's origin
    ///
    /// Conversation holders use [`Answer::is_fallback`] to decide whether
    /// a turn belongs in the history.
    pub async fn answer_about_notes<Q, A>(
        &self,
        questions: &[Q],
        responses: &[A],
    ) -> Result<Answer>
    where
        Q: AsRef<str> + Sync,
        A: AsRef<str> + Sync,
    {
        match self.answer(questions, responses).await {
            Ok(answer) => Ok(answer),
            Err(err) if is_transport_failure(&err) => {
                tracing::error!("Completion failed, returning fallback answer: {:#}", err);
                Ok(Answer::fallback(
                    AnswerSource::Unavailable,
                    TRANSPORT_FAILURE_FALLBACK,
                ))
            }
            Err(err) => Err(err),
        }
    }

    /// Create a note owned by the caller
    pub async fn create_note(&self, text: impl Into<String>) -> Result<Note> {
        let identity = self.authorize("create a note")?;
        let note = Note::new(identity.user_id, text);
        self.store.insert_note(&note).await?;
        tracing::info!(id = %note.id, author = %note.author_id, "Created note");
        Ok(note)
    }

    /// Replace the text of one of the caller's notes
    ///
    /// # Errors
    ///
    /// `NoteNotFound` when the note does not exist or belongs to someone
    /// else.
    pub async fn update_note(&self, id: &str, text: impl Into<String>) -> Result<Note> {
        let identity = self.authorize("update a note")?;
        let mut note = self.owned_note(&identity, id).await?;

        note.text = text.into();
        note.updated_at = Utc::now();

        if !self.store.update_note(&note).await? {
            return Err(NotesAiError::NoteNotFound(id.to_string()).into());
        }
        tracing::info!(id = %note.id, author = %note.author_id, "Updated note");
        Ok(note)
    }

    /// Delete one of the caller's notes
    pub async fn delete_note(&self, id: &str) -> Result<()> {
        let identity = self.authorize("delete a note")?;
        if !self.store.delete_note(&identity.user_id, id).await? {
            return Err(NotesAiError::NoteNotFound(id.to_string()).into());
        }
        tracing::info!(id, author = %identity.user_id, "Deleted note");
        Ok(())
    }

    /// The caller's notes, newest first
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let identity = self.authorize("list notes")?;
        self.store.list_notes(&identity.user_id).await
    }

    /// One of the caller's notes
    pub async fn get_note(&self, id: &str) -> Result<Note> {
        let identity = self.authorize("read a note")?;
        self.owned_note(&identity, id).await
    }

    async fn owned_note(&self, identity: &Identity, id: &str) -> Result<Note> {
        match self.store.get_note(id).await? {
            Some(note) if note.author_id == identity.user_id => Ok(note),
            Some(_) => {
                tracing::warn!(id, user = %identity.user_id, "Note belongs to another user");
                Err(NotesAiError::NoteNotFound(id.to_string()).into())
            }
            None => Err(NotesAiError::NoteNotFound(id.to_string()).into()),
        }
    }
}
