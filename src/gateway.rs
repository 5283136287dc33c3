//! Completion gateway
//!
//! Translates assembled [`ConversationMessage`]s into provider messages,
//! issues exactly one completion request and extracts the answer text.
//! Transport failures propagate to the caller untouched; a response without
//! usable text becomes [`MALFORMED_RESPONSE_FALLBACK`].

use crate::conversation::{ConversationMessage, MessageRole};
use crate::error::{NotesAiError, Result};
use crate::providers::{Message, Provider};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Answer returned when the completion service produced no text
pub const MALFORMED_RESPONSE_FALLBACK: &str = "A problem has occurred";

const BLOCKED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];

const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "action",
    "formaction",
    "xlink:href",
    "poster",
    "background",
];

const SCRIPT_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// Strips active content from HTML answers before they reach a renderer
///
/// Removes script-like elements, inline event handler attributes and
/// `javascript:` URLs. Attributes are read the way a browser splits them,
/// so `/` separators and entity-encoded schemes are caught too. Everything
/// else passes through unchanged.
#[derive(Debug, Clone)]
pub struct AnswerSanitizer {
    element_blocks: Vec<Regex>,
    stray_tags: Regex,
    open_tag: Regex,
    attribute: Regex,
    entity: Regex,
}

impl AnswerSanitizer {
    /// Compile the sanitizer patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::gateway::AnswerSanitizer;
    ///
    /// let sanitizer = AnswerSanitizer::new().unwrap();
    /// let clean = sanitizer.sanitize("<p onclick=\"x()\">Hi</p><script>alert(1)</script>");
    /// assert_eq!(clean, "<p>Hi</p>");
    /// ```
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                NotesAiError::Config(format!("Invalid sanitizer pattern {}: {}", pattern, e))
            })
        };

        let element_blocks = BLOCKED_ELEMENTS
            .iter()
            .map(|tag| compile(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>", tag = tag)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            element_blocks,
            stray_tags: compile(&format!(
                r"(?i)</?(?:{})\b[^>]*>",
                BLOCKED_ELEMENTS.join("|")
            ))?,
            open_tag: compile(r#"<([a-zA-Z][a-zA-Z0-9:-]*)((?:"[^"]*"|'[^']*'|[^'">])*)>"#)?,
            attribute: compile(r#"([^\s/>"'=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>"']*))?"#)?,
            entity: compile(r"(?i)&(?:#x([0-9a-f]+)|#([0-9]+)|([a-z]+));?")?,
        })
    }

    /// Return `answer` with active content removed
    pub fn sanitize(&self, answer: &str) -> String {
        let mut out = answer.to_string();
        for block in &self.element_blocks {
            out = block.replace_all(&out, "").into_owned();
        }
        out = self.stray_tags.replace_all(&out, "").into_owned();
        self.open_tag
            .replace_all(&out, |caps: &Captures| self.clean_tag(caps))
            .into_owned()
    }

    /// Rebuild one opening tag without handlers and script URLs
    ///
    /// Tags with nothing to remove are returned byte for byte.
    fn clean_tag(&self, caps: &Captures) -> String {
        let original = &caps[0];
        let name = &caps[1];
        let attributes = caps.get(2).map_or("", |m| m.as_str());

        let mut changed = false;
        let mut kept = Vec::new();
        for attr in self.attribute.captures_iter(attributes) {
            let attr_name = &attr[1];
            let lowered = attr_name.to_ascii_lowercase();
            if lowered.starts_with("on") {
                changed = true;
                continue;
            }
            match attr.get(2) {
                Some(value)
                    if URL_ATTRIBUTES.contains(&lowered.as_str())
                        && self.is_script_url(value.as_str()) =>
                {
                    changed = true;
                    kept.push(format!("{}=\"#\"", attr_name));
                }
                Some(value) => kept.push(format!("{}={}", attr_name, value.as_str())),
                None => kept.push(attr_name.to_string()),
            }
        }

        if !changed {
            return original.to_string();
        }

        let mut tag = format!("<{}", name);
        for attr in kept {
            tag.push(' ');
            tag.push_str(&attr);
        }
        if attributes.trim_end().ends_with('/') {
            tag.push_str(" /");
        }
        tag.push('>');
        tag
    }

    /// True when an attribute value resolves to a script scheme once
    /// entities are decoded and whitespace or control characters dropped
    fn is_script_url(&self, raw: &str) -> bool {
        let unquoted = raw.trim_matches(|c: char| c == '"' || c == '\'');
        let decoded = self.decode_entities(unquoted);
        let compact: String = decoded
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_ascii_lowercase();
        SCRIPT_SCHEMES
            .iter()
            .any(|scheme| compact.starts_with(scheme))
    }

    fn decode_entities(&self, value: &str) -> String {
        self.entity
            .replace_all(value, |caps: &Captures| {
                let code = if let Some(hex) = caps.get(1) {
                    u32::from_str_radix(hex.as_str(), 16).ok()
                } else if let Some(dec) = caps.get(2) {
                    dec.as_str().parse::<u32>().ok()
                } else {
                    match caps[3].to_ascii_lowercase().as_str() {
                        "colon" => Some(':' as u32),
                        "tab" => Some('\t' as u32),
                        "newline" => Some('\n' as u32),
                        "amp" => Some('&' as u32),
                        "lpar" => Some('(' as u32),
                        "rpar" => Some(')' as u32),
                        _ => None,
                    }
                };
                match code.and_then(char::from_u32) {
                    Some(c) => c.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Where the text of an [`Answer`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Produced by the completion service
    Model,
    /// The caller owns no notes and no request was made
    EmptyCorpus,
    /// The service replied without usable text
    MalformedResponse,
    /// The service could not be reached or refused the request
    Unavailable,
}

/// Answer text tagged with its origin
///
/// Callers that keep history use [`Answer::is_fallback`] instead of
/// comparing text, so a model reply that happens to read like a fallback
/// message is still treated as a real answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Text shown to the user
    pub text: String,
    /// Origin of `text`
    pub source: AnswerSource,
}

impl Answer {
    /// Answer produced by the completion service
    pub fn from_model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: AnswerSource::Model,
        }
    }

    /// Canned answer standing in for a model reply
    pub fn fallback(source: AnswerSource, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    /// True for every answer not written by the model
    pub fn is_fallback(&self) -> bool {
        self.source != AnswerSource::Model
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Single-attempt transport to the completion service
pub struct CompletionGateway {
    provider: Arc<dyn Provider>,
    sanitizer: Option<AnswerSanitizer>,
}

impl CompletionGateway {
    /// Create a gateway that returns answers as produced
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            sanitizer: None,
        }
    }

    /// Sanitize every answer before returning it
    pub fn with_sanitizer(mut self, sanitizer: AnswerSanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Model identifier the provider sends with each request
    pub fn model(&self) -> String {
        self.provider.model()
    }

    /// Map assembled roles onto chat-completion roles
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::conversation::ConversationMessage;
    /// use notesai::gateway::CompletionGateway;
    ///
    /// let wire = CompletionGateway::to_provider_messages(&[
    ///     ConversationMessage::context("ctx"),
    ///     ConversationMessage::question("q"),
    ///     ConversationMessage::answer("a"),
    /// ]);
    /// let roles: Vec<&str> = wire.iter().map(|m| m.role.as_str()).collect();
    /// assert_eq!(roles, vec!["system", "user", "assistant"]);
    /// ```
    pub fn to_provider_messages(messages: &[ConversationMessage]) -> Vec<Message> {
        messages
            .iter()
            .map(|m| match m.role {
                MessageRole::Context => Message::system(m.content.clone()),
                MessageRole::Question => Message::user(m.content.clone()),
                MessageRole::Answer => Message::assistant(m.content.clone()),
            })
            .collect()
    }

    /// Send `messages` and return the first choice's text
    ///
    /// # Errors
    ///
    /// Propagates any provider failure (network, authentication, rate
    /// limit, unparsable body). Never retries.
    pub async fn complete(&self, messages: &[ConversationMessage]) -> Result<Answer> {
        let wire = Self::to_provider_messages(messages);
        tracing::debug!(
            provider = self.provider.name(),
            model = %self.provider.model(),
            messages = wire.len(),
            "Requesting completion"
        );

        let response = self.provider.complete(&wire).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Completion token usage"
            );
        }

        let answer = response
            .message
            .content
            .map(|text| match &self.sanitizer {
                Some(sanitizer) => sanitizer.sanitize(&text),
                None => text,
            })
            .filter(|text| !text.trim().is_empty());

        match answer {
            Some(text) => {
                tracing::debug!(chars = text.len(), "Completion answered");
                Ok(Answer::from_model(text))
            }
            None => {
                tracing::warn!("Completion returned no usable content; using fallback answer");
                Ok(Answer::fallback(
                    AnswerSource::MalformedResponse,
                    MALFORMED_RESPONSE_FALLBACK,
                ))
            }
        }
    }
}
