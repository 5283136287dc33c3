//! System prompts for the notes assistant
//!
//! The context message is a fixed persona preamble followed by the rendered
//! note corpus. The preamble never depends on the notes themselves; only the
//! answer-format instructions vary with the [`ContextFormat`].

pub mod notes_prompt;

use crate::context::ContextFormat;

/// Builds the full context message content
///
/// # Arguments
///
/// * `format` - Serialization used for `formatted_notes`
/// * `formatted_notes` - Output of [`crate::context::NoteContextFormatter`]
///
/// # Examples
///
/// ```
/// use notesai::context::ContextFormat;
/// use notesai::prompts::build_context_message;
///
/// let content = build_context_message(ContextFormat::Html, "<article>n</article>");
/// assert!(content.contains("Notes Database"));
/// assert!(content.ends_with("<article>n</article>"));
/// ```
pub fn build_context_message(format: ContextFormat, formatted_notes: &str) -> String {
    format!(
        "{}\n\n{}\n{}",
        notes_prompt::generate_preamble(format),
        notes_prompt::notes_heading(format),
        formatted_notes
    )
}
