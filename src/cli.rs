//! Command-line interface definition for NotesAI
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for asking questions about notes, interactive chat,
//! and managing the note corpus.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NotesAI - ask an assistant about your own notes
///
/// Every question is answered with the caller's complete note corpus
/// embedded as context.
#[derive(Parser, Debug, Clone)]
#[command(name = "notesai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Act as this user (overrides identity.user_id and NOTESAI_USER)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Override the provider from config (openai, ollama)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Override the model of the selected provider
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for NotesAI
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ask one question, optionally replaying earlier turns
    ///
    /// Pass earlier turns as alternating `-q`/`-r` pairs; the last `-q`
    /// is the question being asked.
    Ask {
        /// Question text; repeat for earlier turns
        #[arg(short = 'q', long = "question", required = true)]
        questions: Vec<String>,

        /// Earlier answer; one fewer than the questions
        #[arg(short = 'r', long = "response")]
        responses: Vec<String>,
    },

    /// Start an interactive conversation about your notes
    Chat,

    /// Manage notes
    Notes {
        /// Notes subcommand
        #[command(subcommand)]
        command: NotesCommand,
    },
}

/// Note management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum NotesCommand {
    /// Create a note
    New {
        /// Note text (first line `Title: ...` becomes the heading)
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the note text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Replace the text of an existing note
    Edit {
        /// Note id
        id: String,

        /// New note text
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the new text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a note
    Delete {
        /// Note id
        id: String,
    },

    /// List your notes, newest first
    List,

    /// Print one note as it appears in the assistant's context
    Show {
        /// Note id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            user: None,
            provider: None,
            model: None,
            command: Commands::Notes {
                command: NotesCommand::List,
            },
        }
    }
}
