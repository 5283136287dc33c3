//! Special commands parser for interactive chat mode
//!
//! Special commands manage the chat session itself instead of being sent
//! to the assistant. Commands are prefixed with `/` and are
//! case-insensitive; `exit` and `quit` also work without the slash.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command takes no argument but one was given
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Forget all earlier questions and answers
    Clear,

    /// Print the questions and answers sent with the next request
    History,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for unrecognised `/` input and
/// [`CommandError::UnsupportedArgument`] when a command is given an
/// argument.
///
/// # Examples
///
/// ```
/// use notesai::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/CLEAR").unwrap(), SpecialCommand::Clear);
/// assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
/// assert_eq!(
///     parse_special_command("What did I note about margins?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let parsed = match command {
        "/clear" | "/reset" => SpecialCommand::Clear,
        "/history" => SpecialCommand::History,
        "/help" | "/?" => SpecialCommand::Help,
        "/exit" | "/quit" | "exit" | "quit" => SpecialCommand::Exit,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    match arg {
        Some(arg) => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
        None => Ok(parsed),
    }
}

/// Print help for the interactive chat session
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

SESSION:
  /history        - Show the questions and answers sent with each request
  /clear          - Forget earlier questions and answers
  /reset          - Same as /clear
  /help           - Show this help message
  /?              - Same as /help

SESSION CONTROL:
  /exit, exit     - Exit interactive mode
  /quit, quit     - Same as exit
  Ctrl-C, Ctrl-D  - Same as exit

NOTES:
  Every question is answered using all of your notes. Earlier turns are
  re-sent with each question so follow-ups keep their context.
"#
    );
}
