//! Note corpus formatting
//!
//! Turns a user's notes into the single text block embedded in the context
//! message. Formatting happens in two steps: each [`Note`] is first parsed
//! into a neutral [`RenderedNote`] (heading, link lines, body lines,
//! timestamps) and then serialized for the selected [`ContextFormat`].
//! Nothing is summarized, truncated, deduplicated or reordered.

use crate::error::{NotesAiError, Result};
use crate::storage::Note;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker that turns the first line of a note into its heading
pub const TITLE_MARKER: &str = "Title:";

/// Marker that turns a body line into a source link
pub const URL_MARKER: &str = "URL:";

/// Heading used when a note has no title line
pub const UNTITLED_HEADING: &str = "Untitled Note";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Serialization target for the note corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextFormat {
    /// `<article>` markup per note, separated by `<hr>`
    #[default]
    Html,
    /// Markdown-ish plain text, separated by `---`
    Plain,
}

impl ContextFormat {
    /// Parse a format name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::context::ContextFormat;
    ///
    /// assert_eq!(ContextFormat::parse_str("HTML").unwrap(), ContextFormat::Html);
    /// assert_eq!(ContextFormat::parse_str("text").unwrap(), ContextFormat::Plain);
    /// assert!(ContextFormat::parse_str("pdf").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "plain" | "text" => Ok(Self::Plain),
            other => Err(NotesAiError::Config(format!(
                "Invalid context format: {}. Must be one of: html, plain",
                other
            ))
            .into()),
        }
    }

    /// Separator placed between consecutive notes
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Html => "\n<hr>\n",
            Self::Plain => "\n---\n",
        }
    }
}

impl std::fmt::Display for ContextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// One line of a note body after marker detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteLine {
    /// A `URL:` line; holds the address with the marker removed
    Link(String),
    /// Any other line, verbatim
    Text(String),
}

/// Format-neutral structure of a single note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    /// Heading from the `Title:` line, or [`UNTITLED_HEADING`]
    pub title: String,
    /// Body lines in their original order
    pub lines: Vec<NoteLine>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Update time, present only when it differs from `created_at`
    pub updated_at: Option<DateTime<Utc>>,
}

/// Split on `\n` keeping a trailing empty line, tolerating `\r\n`
fn body_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

impl RenderedNote {
    /// Parse a note's text into heading, links and body lines
    ///
    /// A first line without the title marker is kept as a body line under
    /// the generic heading so that no text is lost.
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::context::{NoteLine, RenderedNote};
    /// use notesai::storage::Note;
    ///
    /// let note = Note::new("alice", "Title: Q1 Review\nURL: https://x.test\nGrowth strong");
    /// let rendered = RenderedNote::from_note(&note);
    /// assert_eq!(rendered.title, "Q1 Review");
    /// assert_eq!(rendered.lines, vec![
    ///     NoteLine::Link("https://x.test".to_string()),
    ///     NoteLine::Text("Growth strong".to_string()),
    /// ]);
    /// assert!(rendered.updated_at.is_none());
    /// ```
    pub fn from_note(note: &Note) -> Self {
        let mut raw_lines = body_lines(&note.text).into_iter().peekable();

        let title = match raw_lines
            .peek()
            .and_then(|first| first.strip_prefix(TITLE_MARKER))
        {
            Some(rest) => {
                raw_lines.next();
                let rest = rest.trim();
                if rest.is_empty() {
                    UNTITLED_HEADING.to_string()
                } else {
                    rest.to_string()
                }
            }
            None => UNTITLED_HEADING.to_string(),
        };

        let lines = raw_lines
            .map(|line| match line.strip_prefix(URL_MARKER) {
                Some(url) => NoteLine::Link(url.trim().to_string()),
                None => NoteLine::Text(line.to_string()),
            })
            .collect();

        Self {
            title,
            lines,
            created_at: note.created_at,
            updated_at: note.was_updated().then_some(note.updated_at),
        }
    }

    fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<article class=\"note\">\n");
        out.push_str(&format!("<h3>{}</h3>\n", self.title));
        for line in &self.lines {
            match line {
                NoteLine::Link(url) => out.push_str(&format!(
                    "<p><strong>Source Link:</strong> <a href=\"{}\" target=\"_blank\" rel=\"noopener\">View Original</a></p>\n",
                    url.replace('"', "&quot;")
                )),
                NoteLine::Text(text) => out.push_str(&format!("<p>{}</p>\n", text)),
            }
        }
        out.push_str("<footer>");
        out.push_str(&format!(
            "<time>Created: {}</time>",
            self.created_at.format(TIMESTAMP_FORMAT)
        ));
        if let Some(updated_at) = self.updated_at {
            out.push_str(&format!(
                "<time> | Updated: {}</time>",
                updated_at.format(TIMESTAMP_FORMAT)
            ));
        }
        out.push_str("</footer>\n</article>");
        out
    }

    fn to_plain(&self) -> String {
        let mut out = format!("## {}\n", self.title);
        for line in &self.lines {
            match line {
                NoteLine::Link(url) => out.push_str(&format!("Source Link: {}\n", url)),
                NoteLine::Text(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        out.push_str(&format!(
            "Created: {}",
            self.created_at.format(TIMESTAMP_FORMAT)
        ));
        if let Some(updated_at) = self.updated_at {
            out.push_str(&format!(
                " | Updated: {}",
                updated_at.format(TIMESTAMP_FORMAT)
            ));
        }
        out
    }

    /// Serialize this note for `format`
    pub fn render(&self, format: ContextFormat) -> String {
        match format {
            ContextFormat::Html => self.to_html(),
            ContextFormat::Plain => self.to_plain(),
        }
    }
}

/// Renders a note corpus into one block for the context message
///
/// A pure function of its input: the same notes always produce the same
/// output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteContextFormatter {
    format: ContextFormat,
}

impl NoteContextFormatter {
    /// Create a formatter for `format`
    pub fn new(format: ContextFormat) -> Self {
        Self { format }
    }

    /// Selected serialization target
    pub fn format(&self) -> ContextFormat {
        self.format
    }

    /// Render `notes` (newest first) in input order, separated by the
    /// format's separator
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::context::{ContextFormat, NoteContextFormatter};
    /// use notesai::storage::Note;
    ///
    /// let notes = vec![Note::new("a", "Title: One"), Note::new("a", "Title: Two")];
    /// let text = NoteContextFormatter::new(ContextFormat::Plain).format_notes(&notes);
    /// assert!(text.find("## One").unwrap() < text.find("## Two").unwrap());
    /// assert!(text.contains("\n---\n"));
    /// ```
    pub fn format_notes(&self, notes: &[Note]) -> String {
        notes
            .iter()
            .map(|note| RenderedNote::from_note(note).render(self.format))
            .collect::<Vec<_>>()
            .join(self.format.separator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t1() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-04-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            author_id: "alice".to_string(),
            text: text.to_string(),
            created_at: t1(),
            updated_at: t1(),
        }
    }

    #[test]
    fn test_title_line_becomes_heading() {
        let html = NoteContextFormatter::new(ContextFormat::Html)
            .format_notes(&[note("1", "Title: Q1 Review\nGrowth strong")]);
        assert!(html.contains("<h3>Q1 Review</h3>"));
        assert!(html.contains("<p>Growth strong</p>"));
        assert!(!html.contains("Title:"));
    }

    #[test]
    fn test_missing_title_uses_untitled_and_keeps_first_line() {
        let rendered = RenderedNote::from_note(&note("1", "Buy more NVDA\nSecond line"));
        assert_eq!(rendered.title, UNTITLED_HEADING);
        assert_eq!(
            rendered.lines,
            vec![
                NoteLine::Text("Buy more NVDA".to_string()),
                NoteLine::Text("Second line".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_title_marker_is_untitled() {
        let rendered = RenderedNote::from_note(&note("1", "Title:   \nbody"));
        assert_eq!(rendered.title, UNTITLED_HEADING);
        assert_eq!(rendered.lines, vec![NoteLine::Text("body".to_string())]);
    }

    #[test]
    fn test_title_only_note_has_heading_and_no_body() {
        let rendered = RenderedNote::from_note(&note("1", "Title: Lonely"));
        assert_eq!(rendered.title, "Lonely");
        assert!(rendered.lines.is_empty());

        let html = rendered.render(ContextFormat::Html);
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_empty_note_is_untitled_without_body() {
        let rendered = RenderedNote::from_note(&note("1", ""));
        assert_eq!(rendered.title, UNTITLED_HEADING);
        assert!(rendered.lines.is_empty());
    }

    #[test]
    fn test_url_line_rendered_as_link() {
        let html = NoteContextFormatter::new(ContextFormat::Html)
            .format_notes(&[note("1", "Title: T\nURL: https://x.test/a?b=1")]);
        assert!(html.contains(
            "<a href=\"https://x.test/a?b=1\" target=\"_blank\" rel=\"noopener\">View Original</a>"
        ));
        assert!(html.contains("<strong>Source Link:</strong>"));

        let plain = NoteContextFormatter::new(ContextFormat::Plain)
            .format_notes(&[note("1", "Title: T\nURL: https://x.test/a?b=1")]);
        assert!(plain.contains("Source Link: https://x.test/a?b=1\n"));
    }

    #[test]
    fn test_url_quotes_are_escaped_in_href() {
        let html = RenderedNote::from_note(&note("1", "URL: https://x.test/\"><script>"))
            .render(ContextFormat::Html);
        assert!(html.contains("href=\"https://x.test/&quot;><script>\""));
    }

    #[test]
    fn test_update_timestamp_only_when_changed() {
        let unchanged = NoteContextFormatter::new(ContextFormat::Html)
            .format_notes(&[note("1", "Title: T")]);
        assert!(unchanged.contains("<time>Created: 2025-04-01 09:30 UTC</time>"));
        assert!(!unchanged.contains("Updated"));

        let mut changed = note("1", "Title: T");
        changed.updated_at = t1() + Duration::days(1);
        let html = NoteContextFormatter::new(ContextFormat::Html).format_notes(&[changed]);
        assert!(html.contains("<time> | Updated: 2025-04-02 09:30 UTC</time>"));
    }

    #[test]
    fn test_body_lines_preserved_verbatim_in_order_once() {
        let body = [
            "  indented line",
            "Growth strong",
            "",
            "Growth strong",
            "<b>raw markup</b> & stuff",
            "URL without colon prefix",
        ];
        let text = format!("Title: Mixed\n{}", body.join("\n"));
        let notes = vec![note("1", &text), note("2", "Title: Other\nunique tail")];

        for format in [ContextFormat::Html, ContextFormat::Plain] {
            let rendered = RenderedNote::from_note(&notes[0]);
            let texts: Vec<&str> = rendered
                .lines
                .iter()
                .map(|l| match l {
                    NoteLine::Text(t) => t.as_str(),
                    NoteLine::Link(u) => u.as_str(),
                })
                .collect();
            assert_eq!(texts, body.to_vec());

            let out = NoteContextFormatter::new(format).format_notes(&notes);
            assert_eq!(out.matches("<b>raw markup</b> & stuff").count(), 1);
            assert_eq!(out.matches("Growth strong").count(), 2);
            assert_eq!(out.matches("unique tail").count(), 1);
            let first = out.find("  indented line").unwrap();
            let second = out.find("<b>raw markup</b>").unwrap();
            let third = out.find("URL without colon prefix").unwrap();
            assert!(first < second && second < third);
        }
    }

    #[test]
    fn test_notes_concatenated_in_input_order_with_separator() {
        let notes = vec![note("1", "Title: Newest"), note("2", "Title: Oldest")];
        let html = NoteContextFormatter::new(ContextFormat::Html).format_notes(&notes);

        assert_eq!(html.matches("\n<hr>\n").count(), 1);
        assert!(html.find("Newest").unwrap() < html.find("Oldest").unwrap());
        assert!(html.starts_with("<article class=\"note\">"));
        assert!(html.ends_with("</article>"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let notes = vec![
            note("1", "Title: A\nURL: https://a.test\nline"),
            note("2", "no title\nmore"),
        ];
        for format in [ContextFormat::Html, ContextFormat::Plain] {
            let formatter = NoteContextFormatter::new(format);
            assert_eq!(formatter.format_notes(&notes), formatter.format_notes(&notes));
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let rendered = RenderedNote::from_note(&note("1", "Title: Win\r\nline one\r\nline two"));
        assert_eq!(rendered.title, "Win");
        assert_eq!(
            rendered.lines,
            vec![
                NoteLine::Text("line one".to_string()),
                NoteLine::Text("line two".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_newline_keeps_empty_body_line() {
        let rendered = RenderedNote::from_note(&note("1", "Title: T\nbody\n"));
        assert_eq!(
            rendered.lines,
            vec![
                NoteLine::Text("body".to_string()),
                NoteLine::Text(String::new()),
            ]
        );
        let html = rendered.render(ContextFormat::Html);
        assert!(html.contains("<p>body</p>\n<p></p>\n<footer>"));
    }

    #[test]
    fn test_context_format_serde_names() {
        let yaml = serde_yaml::to_string(&ContextFormat::Plain).unwrap();
        assert!(yaml.contains("plain"));
        let parsed: ContextFormat = serde_yaml::from_str("html").unwrap();
        assert_eq!(parsed, ContextFormat::Html);
    }
}
