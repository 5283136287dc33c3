//! Persona preamble for the notes assistant

use crate::context::ContextFormat;

const PERSONA: &str = r#"You are a Senior Financial Research Assistant that answers questions about the user's notes.
Assume every question relates to the notes below unless it clearly does not.

GUIDELINES:
- Reference specific data points from the notes whenever they are available
- Highlight key financial metrics, technical indicators and sentiment
- Use proper financial terminology (e.g. "support/resistance levels" instead of "high/low points")
- Flag potential risks and opportunities explicitly
- Keep answers succinct; prefer short bullet points for actionable insights
- If the notes do not contain the answer, say so instead of guessing"#;

const HTML_RULES: &str = r#"FORMAT:
Your response MUST be clean, valid HTML fragment markup.
Use tags like <p>, <strong>, <em>, <ul>, <ol>, <li>, <h4> and <br> when appropriate.
Do NOT wrap the entire response in a single <p> tag unless it is a single paragraph.
Never emit <script>, <style>, inline styles, event handler attributes or custom attributes."#;

const PLAIN_RULES: &str = r#"FORMAT:
Respond in plain text. Use "-" for bullet points and blank lines between sections.
Do not emit markup."#;

/// Generates the fixed preamble for `format`
///
/// # Examples
///
/// ```
/// use notesai::context::ContextFormat;
/// use notesai::prompts::notes_prompt::generate_preamble;
///
/// assert!(generate_preamble(ContextFormat::Html).contains("Research Assistant"));
/// ```
pub fn generate_preamble(format: ContextFormat) -> String {
    let rules = match format {
        ContextFormat::Html => HTML_RULES,
        ContextFormat::Plain => PLAIN_RULES,
    };
    format!("{}\n\n{}", PERSONA, rules)
}

/// Heading line that introduces the note corpus
pub fn notes_heading(format: ContextFormat) -> &'static str {
    match format {
        ContextFormat::Html => "<h4>Notes Database:</h4>",
        ContextFormat::Plain => "Notes Database:",
    }
}
