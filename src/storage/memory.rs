use super::{sort_newest_first, NoteStore, Result};
use crate::error::NotesAiError;
use crate::storage::Note;
use async_trait::async_trait;
use std::sync::RwLock;

/// Volatile note store kept behind a lock
///
/// Useful for tests and for embedding the pipeline without a database.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `notes`
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::storage::{InMemoryNoteStore, Note, NoteStore};
    ///
    /// let store = InMemoryNoteStore::with_notes(vec![Note::new("alice", "hello")]);
    /// assert_eq!(store.len(), 1);
    /// # tokio_test::block_on(async {
    /// assert_eq!(store.list_notes("alice").await.unwrap().len(), 1);
    /// assert!(store.list_notes("bob").await.unwrap().is_empty());
    /// # });
    /// ```
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
        }
    }

    /// Number of notes across all authors
    pub fn len(&self) -> usize {
        self.notes.read().map(|notes| notes.len()).unwrap_or(0)
    }

    /// True when the store holds no notes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> NotesAiError {
    NotesAiError::Storage("Note store lock poisoned".to_string())
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list_notes(&self, author_id: &str) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .notes
            .read()
            .map_err(|_| poisoned())?
            .iter()
            .filter(|n| n.author_id == author_id)
            .cloned()
            .collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>> {
        Ok(self
            .notes
            .read()
            .map_err(|_| poisoned())?
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn insert_note(&self, note: &Note) -> Result<()> {
        let mut notes = self.notes.write().map_err(|_| poisoned())?;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(
                NotesAiError::Storage(format!("Note {} already exists", note.id)).into(),
            );
        }
        notes.push(note.clone());
        Ok(())
    }

    async fn update_note(&self, note: &Note) -> Result<bool> {
        let mut notes = self.notes.write().map_err(|_| poisoned())?;
        match notes
            .iter_mut()
            .find(|n| n.id == note.id && n.author_id == note.author_id)
        {
            Some(existing) => {
                existing.text = note.text.clone();
                existing.updated_at = note.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_note(&self, author_id: &str, id: &str) -> Result<bool> {
        let mut notes = self.notes.write().map_err(|_| poisoned())?;
        let before = notes.len();
        notes.retain(|n| !(n.id == id && n.author_id == author_id));
        Ok(notes.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_list_notes_filters_and_orders() {
        let base = Utc::now();
        let mut older = Note::new("alice", "older");
        older.created_at = base - Duration::hours(1);
        let mut newer = Note::new("alice", "newer");
        newer.created_at = base;
        let other = Note::new("bob", "bob");

        let store = InMemoryNoteStore::with_notes(vec![older, newer, other]);
        let notes = store.list_notes("alice").await.unwrap();

        let texts: Vec<&str> = notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = InMemoryNoteStore::new();
        let note = Note::new("alice", "x");
        store.insert_note(&note).await.unwrap();
        assert!(store.insert_note(&note).await.is_err());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_respect_author() {
        let store = InMemoryNoteStore::new();
        let note = Note::new("alice", "x");
        store.insert_note(&note).await.unwrap();

        let mut foreign = note.clone();
        foreign.author_id = "bob".to_string();
        assert!(!store.update_note(&foreign).await.unwrap());
        assert!(!store.delete_note("bob", &note.id).await.unwrap());

        assert!(store.delete_note("alice", &note.id).await.unwrap());
        assert!(store.is_empty());
    }
}
