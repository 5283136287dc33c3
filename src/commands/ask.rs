//! One-shot question handler
//!
//! Earlier turns are passed back in as parallel `-q`/`-r` lists, matching
//! the stateless contract of the service.

use crate::config::Config;
use crate::error::Result;

/// Answer the last of `questions` and print it to stdout
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `questions` - Every question so far, oldest first
/// * `responses` - Answers to the earlier questions, oldest first
///
/// # Errors
///
/// Returns error if the caller is not signed in, the note store fails, or
/// the service cannot be built
pub async fn run_ask(config: &Config, questions: Vec<String>, responses: Vec<String>) -> Result<()> {
    if responses.len() >= questions.len() {
        tracing::warn!(
            questions = questions.len(),
            responses = responses.len(),
            "No unanswered question; surplus responses will be ignored"
        );
    }

    let service = super::build_service(config)?;
    let answer = service
        .ask_about_notes(questions.as_slice(), responses.as_slice())
        .await?;
    println!("{}", answer);
    Ok(())
}
