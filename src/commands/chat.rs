//! Interactive chat mode handler.
//!
//! Runs a readline loop that keeps the caller-side question and answer
//! lists and re-sends the whole conversation with every question.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::service::NotesAiService;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Caller-side conversation state
///
/// The service keeps nothing between calls, so the session owns the
/// parallel lists and sends them back each turn.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    questions: Vec<String>,
    responses: Vec<String>,
}

impl ChatSession {
    /// Start an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask `question` with all earlier turns
    ///
    /// Real answers are appended to the history. Fallback answers are
    /// shown but not recorded, and the question is dropped so it can be
    /// asked again.
    ///
    /// # Errors
    ///
    /// Returns the service error; the question is not recorded.
    pub async fn ask(&mut self, service: &NotesAiService, question: &str) -> Result<String> {
        self.questions.push(question.to_string());

        match service
            .answer_about_notes(self.questions.as_slice(), self.responses.as_slice())
            .await
        {
            Ok(answer) => {
                if answer.is_fallback() {
                    tracing::debug!(source = ?answer.source, "Fallback answer not recorded");
                    self.questions.pop();
                } else {
                    self.responses.push(answer.text.clone());
                }
                Ok(answer.text)
            }
            Err(err) => {
                self.questions.pop();
                Err(err)
            }
        }
    }

    /// Forget every turn
    pub fn clear(&mut self) {
        self.questions.clear();
        self.responses.clear();
    }

    /// Number of answered turns
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// True before the first answered question
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Answered turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.responses.iter())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }
}

/// Start interactive chat mode
///
/// # Errors
///
/// Returns error if the service cannot be built or the terminal cannot
/// be initialised. Errors for individual questions are printed and the
/// loop continues.
pub async fn run_chat(config: &Config) -> Result<()> {
    let service = super::build_service(config)?;
    let mut session = ChatSession::new();
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&service.model());

    loop {
        let prompt = format!("{} ", "notes>".cyan().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(SpecialCommand::Clear) => {
                        session.clear();
                        println!("{}", "Conversation cleared.".yellow());
                        continue;
                    }
                    Ok(SpecialCommand::History) => {
                        print_history(&session);
                        continue;
                    }
                    Ok(SpecialCommand::None) => {}
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                }

                if let Err(e) = rl.add_history_entry(trimmed) {
                    tracing::debug!("Failed to add history entry: {}", e);
                }

                match session.ask(&service, trimmed).await {
                    Ok(answer) => println!("\n{}\n", answer),
                    Err(e) => eprintln!("{} {:#}", "Error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    tracing::info!(turns = session.len(), "Chat session ended");
    Ok(())
}

fn print_welcome_banner(model: &str) {
    println!("\n{}", "NotesAI Interactive Chat".bold());
    println!("Model: {}", model.green());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

fn print_history(session: &ChatSession) {
    if session.is_empty() {
        println!("{}", "No earlier turns.".dimmed());
        return;
    }
    for (i, (question, answer)) in session.turns().enumerate() {
        println!("{} {}", format!("Q{}:", i + 1).cyan().bold(), question);
        println!("{} {}\n", format!("A{}:", i + 1).green().bold(), answer);
    }
}
