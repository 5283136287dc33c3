use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored free-text note owned by a single author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Identity of the owning user
    pub author_id: String,
    /// Free-form text; the first line may carry a `Title:` marker and later
    /// lines may carry `URL:` markers
    pub text: String,
    /// When the note was created
    pub created_at: DateTime<Utc>,
    /// When the note was last updated
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note for `author_id` stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::storage::Note;
    ///
    /// let note = Note::new("user-1", "Title: Q1 Review");
    /// assert_eq!(note.author_id, "user-1");
    /// assert_eq!(note.created_at, note.updated_at);
    /// assert_eq!(note.id.len(), 36);
    /// ```
    pub fn new(author_id: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author_id: author_id.into(),
            text: text.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the note was modified after creation
    pub fn was_updated(&self) -> bool {
        self.updated_at != self.created_at
    }
}
