//! Note storage
//!
//! The pipeline only ever reads notes through the [`NoteStore`] trait, so
//! the backing store can be swapped for a fake in tests. Two backends are
//! provided: [`SqliteNoteStore`] for the CLI and [`InMemoryNoteStore`].

use crate::error::Result;
use async_trait::async_trait;

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::InMemoryNoteStore;
pub use sqlite::SqliteNoteStore;
pub use types::Note;

/// Persistence collaborator for notes
///
/// Listing is read-only from the pipeline's perspective; the write
/// operations back the note actions on [`crate::service::NotesAiService`].
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List every note owned by `author_id`, newest first
    ///
    /// Ordering is `created_at` descending with ties broken by id so that
    /// repeated reads of an unchanged corpus are identical.
    async fn list_notes(&self, author_id: &str) -> Result<Vec<Note>>;

    /// Fetch a note by id regardless of owner
    async fn get_note(&self, id: &str) -> Result<Option<Note>>;

    /// Insert a new note
    async fn insert_note(&self, note: &Note) -> Result<()>;

    /// Replace the text and `updated_at` of an existing note
    ///
    /// Returns false when no note with that id and author exists.
    async fn update_note(&self, note: &Note) -> Result<bool>;

    /// Delete the note `id` owned by `author_id`
    ///
    /// Returns false when nothing matched.
    async fn delete_note(&self, author_id: &str, id: &str) -> Result<bool>;
}

/// Sort notes newest first, ties broken by id
pub(crate) fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
