//! Conversation transcript and per-turn driver.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::App;
use crate::chain::ChainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Append-only, insertion-ordered message log.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return it.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        &self.messages[self.messages.len() - 1]
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The user message and the reply recorded by one successful turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange<'t> {
    pub question: &'t Message,
    pub answer: &'t Message,
}

/// One user's conversation with the assistant.
pub struct ChatSession<'a> {
    app: &'a App,
    transcript: Transcript,
}

impl<'a> ChatSession<'a> {
    #[must_use]
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            transcript: Transcript::new(),
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record `input`, answer it, and record the answer.
    ///
    /// The user message is kept even when answering fails; the assistant
    /// message is only appended on success.
    pub fn turn(&mut self, input: &str) -> Result<Exchange<'_>, ChainError> {
        let question_at = self.transcript.len();
        self.transcript.push(Role::User, input);

        match self.app.answer(input) {
            Ok(answer) => {
                self.transcript.push(Role::Assistant, answer);
                let messages = self.transcript.messages();
                Ok(Exchange {
                    question: &messages[question_at],
                    answer: &messages[question_at + 1],
                })
            }
            Err(e) => {
                warn!("Turn aborted: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_insertion_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.push(Role::User, "hi");
        transcript.push(Role::Assistant, "hello");
        transcript.push(Role::User, "bye");

        let roles: Vec<Role> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(transcript.messages()[2].content, "bye");
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_role_serialization() {
        let msg = Message {
            role: Role::Assistant,
            content: "ok".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
        assert_eq!(Role::User.to_string(), "user");
    }
}
