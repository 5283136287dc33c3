//! Conversation assembly
//!
//! Callers hand over their history as two parallel arrays: every question
//! asked so far and the answers received so far. [`ConversationHistory`]
//! normalizes that at the boundary into ordered turns, clamping surplus
//! answers instead of failing, and [`ConversationAssembler`] turns the
//! result into the message sequence sent to the completion service.

use crate::context::ContextFormat;
use crate::prompts::build_context_message;
use serde::{Deserialize, Serialize};

/// Role of an assembled message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona preamble plus the note corpus
    Context,
    /// A question from the user
    Question,
    /// A previous answer from the assistant
    Answer,
}

/// One entry of the assembled conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who the message is attributed to
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ConversationMessage {
    /// Context message
    pub fn context(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Context,
            content: content.into(),
        }
    }

    /// Question message
    pub fn question(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Question,
            content: content.into(),
        }
    }

    /// Answer message
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Answer,
            content: content.into(),
        }
    }
}

/// A question paired with its answer, or pending when unanswered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The question text
    pub question: String,
    /// The answer, absent for a question still awaiting one
    pub answer: Option<String>,
}

/// Ordered turns built from the caller's parallel arrays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
    dropped_answers: usize,
}

impl ConversationHistory {
    /// Pair `questions[i]` with `answers[i]` for every `i < answers.len()`
    ///
    /// Answers beyond `questions.len()` have no question to attach to and
    /// are dropped; the count is kept in [`Self::dropped_answers`].
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::conversation::ConversationHistory;
    ///
    /// let history = ConversationHistory::from_parallel(&["Q1", "Q2"], &["A1"]);
    /// assert_eq!(history.len(), 2);
    /// assert_eq!(history.turns()[0].answer.as_deref(), Some("A1"));
    /// assert_eq!(history.pending_question(), Some("Q2"));
    ///
    /// let clamped = ConversationHistory::from_parallel(&["Q1"], &["A1", "A2"]);
    /// assert_eq!(clamped.dropped_answers(), 1);
    /// ```
    pub fn from_parallel<Q: AsRef<str>, A: AsRef<str>>(questions: &[Q], answers: &[A]) -> Self {
        let dropped_answers = answers.len().saturating_sub(questions.len());
        if dropped_answers > 0 {
            tracing::warn!(
                questions = questions.len(),
                answers = answers.len(),
                "More answers than questions; dropping {} surplus answer(s)",
                dropped_answers
            );
        }

        let turns = questions
            .iter()
            .enumerate()
            .map(|(i, question)| ConversationTurn {
                question: question.as_ref().to_string(),
                answer: answers.get(i).map(|a| a.as_ref().to_string()),
            })
            .collect();

        Self {
            turns,
            dropped_answers,
        }
    }

    /// Turns in question order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no question was supplied
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of surplus answers discarded during normalization
    pub fn dropped_answers(&self) -> usize {
        self.dropped_answers
    }

    /// The newest question when it has no answer yet
    pub fn pending_question(&self) -> Option<&str> {
        self.turns
            .last()
            .filter(|turn| turn.answer.is_none())
            .map(|turn| turn.question.as_str())
    }
}

/// Builds the ordered message sequence for one completion request
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationAssembler {
    format: ContextFormat,
}

impl ConversationAssembler {
    /// Create an assembler whose context preamble matches `format`
    pub fn new(format: ContextFormat) -> Self {
        Self { format }
    }

    /// Emit the context message, then each question immediately followed
    /// by its answer when it has one
    ///
    /// # Examples
    ///
    /// ```
    /// use notesai::context::ContextFormat;
    /// use notesai::conversation::{ConversationAssembler, ConversationHistory, MessageRole};
    ///
    /// let history = ConversationHistory::from_parallel(&["Q1", "Q2"], &["A1"]);
    /// let messages = ConversationAssembler::new(ContextFormat::Html).assemble("notes", &history);
    /// let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    /// assert_eq!(roles, vec![
    ///     MessageRole::Context,
    ///     MessageRole::Question,
    ///     MessageRole::Answer,
    ///     MessageRole::Question,
    /// ]);
    /// ```
    pub fn assemble(
        &self,
        formatted_notes: &str,
        history: &ConversationHistory,
    ) -> Vec<ConversationMessage> {
        let mut messages = Vec::with_capacity(1 + history.len() * 2);
        messages.push(ConversationMessage::context(build_context_message(
            self.format,
            formatted_notes,
        )));

        for turn in history.turns() {
            messages.push(ConversationMessage::question(turn.question.clone()));
            if let Some(answer) = &turn.answer {
                messages.push(ConversationMessage::answer(answer.clone()));
            }
        }

        tracing::debug!(
            turns = history.len(),
            messages = messages.len(),
            "Assembled conversation"
        );
        messages
    }

    /// Normalize the parallel arrays and assemble in one step
    pub fn assemble_parallel<Q: AsRef<str>, A: AsRef<str>>(
        &self,
        formatted_notes: &str,
        questions: &[Q],
        answers: &[A],
    ) -> Vec<ConversationMessage> {
        self.assemble(
            formatted_notes,
            &ConversationHistory::from_parallel(questions, answers),
        )
    }
}
