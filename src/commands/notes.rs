//! Note management commands
//!
//! Thin wrappers over the note actions of [`NotesAiService`] that print
//! results for a terminal.

use crate::cli::NotesCommand;
use crate::config::Config;
use crate::context::{ContextFormat, RenderedNote};
use crate::error::{NotesAiError, Result};
use crate::service::NotesAiService;
use crate::storage::Note;
use colored::Colorize;
use prettytable::{format, row, Table};
use std::path::Path;

/// Execute a `notes` subcommand
///
/// # Errors
///
/// Returns error if the caller is not signed in, the note does not exist
/// or is owned by someone else, or the store fails
pub async fn handle_notes(config: &Config, command: NotesCommand) -> Result<()> {
    let service = super::build_service(config)?;
    run_notes_command(&service, command).await
}

/// Execute a `notes` subcommand against an existing service
pub async fn run_notes_command(service: &NotesAiService, command: NotesCommand) -> Result<()> {
    match command {
        NotesCommand::New { text, file } => {
            let note = service
                .create_note(read_note_text(text, file.as_deref())?)
                .await?;
            println!("{} {}", "Created note".green(), note.id);
        }
        NotesCommand::Edit { id, text, file } => {
            let note = service
                .update_note(&id, read_note_text(text, file.as_deref())?)
                .await?;
            println!("{} {}", "Updated note".green(), note.id);
        }
        NotesCommand::Delete { id } => {
            service.delete_note(&id).await?;
            println!("{} {}", "Deleted note".yellow(), id);
        }
        NotesCommand::List => {
            let notes = service.list_notes().await?;
            if notes.is_empty() {
                println!("{}", "No notes yet.".dimmed());
            } else {
                notes_table(&notes).printstd();
            }
        }
        NotesCommand::Show { id } => {
            let note = service.get_note(&id).await?;
            println!("{}", RenderedNote::from_note(&note).render(ContextFormat::Plain));
        }
    }
    Ok(())
}

/// Note text from the inline argument or a file
///
/// # Errors
///
/// Returns error when neither is given, the file cannot be read, or the
/// text is blank
pub fn read_note_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            NotesAiError::Config(format!("Failed to read note file {}: {}", path.display(), e))
        })?,
        (None, None) => {
            return Err(NotesAiError::Config(
                "Provide the note text or --file <path>".to_string(),
            )
            .into())
        }
    };

    if text.trim().is_empty() {
        return Err(NotesAiError::Config("Note text cannot be empty".to_string()).into());
    }
    Ok(text)
}

/// Build the `notes list` table
pub fn notes_table(notes: &[Note]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["ID", "Title", "Created", "Updated"]);

    for note in notes {
        let rendered = RenderedNote::from_note(note);
        let updated = rendered
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(row![
            note.id,
            rendered.title,
            note.created_at.format("%Y-%m-%d %H:%M"),
            updated
        ]);
    }
    table
}
