use super::{NoteStore, Result};
use crate::error::NotesAiError;
use crate::storage::Note;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

/// SQLite-backed note store
///
/// Each operation opens its own connection on a blocking worker thread, so
/// concurrent invocations never share connection state.
#[derive(Debug, Clone)]
pub struct SqliteNoteStore {
    db_path: PathBuf,
}

impl SqliteNoteStore {
    /// Create a store in the user's data directory
    ///
    /// Honours the `NOTESAI_NOTES_DB` environment variable as an override.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("NOTESAI_NOTES_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "notesai", "notesai")
            .ok_or_else(|| NotesAiError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("notes.db"))
    }

    /// Create a store that uses the specified database path
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::storage::SqliteNoteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteNoteStore::new_with_path(dir.path().join("notes.db")).unwrap();
    /// assert!(store.db_path().ends_with("notes.db"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        tracing::debug!("Opened note store at {}", store.db_path.display());
        Ok(store)
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        let conn = open(&self.db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_notes_author_created
                ON notes (author_id, created_at DESC);",
        )
        .context("Failed to create tables")
        .map_err(|e| NotesAiError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Run `op` against a fresh connection on the blocking pool
    async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open(&db_path)?;
            op(&conn)
        })
        .await
        .map_err(|e| NotesAiError::Storage(format!("Storage task failed: {}", e)))?
    }
}

fn open(db_path: &Path) -> Result<Connection> {
    Connection::open(db_path)
        .context("Failed to open database")
        .map_err(|e| NotesAiError::Storage(e.to_string()).into())
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    // Fixed-width so lexical order in SQL matches chronological order
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        author_id: row.get(1)?,
        text: row.get(2)?,
        created_at: parse_timestamp(row, 3)?,
        updated_at: parse_timestamp(row, 4)?,
    })
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn list_notes(&self, author_id: &str) -> Result<Vec<Note>> {
        let author_id = author_id.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, author_id, text, created_at, updated_at
                    FROM notes
                    WHERE author_id = ?
                    ORDER BY created_at DESC, id ASC",
                )
                .context("Failed to prepare statement")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;

            let notes = stmt
                .query_map(params![author_id], note_from_row)
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Note>>>())
                .context("Failed to query notes")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;

            Ok(notes)
        })
        .await
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>> {
        let id = id.to_string();
        self.with_connection(move |conn| {
            let note = conn
                .query_row(
                    "SELECT id, author_id, text, created_at, updated_at FROM notes WHERE id = ?",
                    params![id],
                    note_from_row,
                )
                .optional()
                .context("Failed to query note")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;
            Ok(note)
        })
        .await
    }

    async fn insert_note(&self, note: &Note) -> Result<()> {
        let note = note.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO notes (id, author_id, text, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)",
                params![
                    note.id,
                    note.author_id,
                    note.text,
                    format_timestamp(&note.created_at),
                    format_timestamp(&note.updated_at)
                ],
            )
            .context("Failed to insert note")
            .map_err(|e| NotesAiError::Storage(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn update_note(&self, note: &Note) -> Result<bool> {
        let note = note.clone();
        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE notes SET text = ?, updated_at = ? WHERE id = ? AND author_id = ?",
                    params![
                        note.text,
                        format_timestamp(&note.updated_at),
                        note.id,
                        note.author_id
                    ],
                )
                .context("Failed to update note")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_note(&self, author_id: &str, id: &str) -> Result<bool> {
        let author_id = author_id.to_string();
        let id = id.to_string();
        self.with_connection(move |conn| {
            let changed = conn
                .execute(
                    "DELETE FROM notes WHERE id = ? AND author_id = ?",
                    params![id, author_id],
                )
                .context("Failed to delete note")
                .map_err(|e| NotesAiError::Storage(e.to_string()))?;
            Ok(changed > 0)
        })
        .await
    }
}
