use crate::story::{Resolution, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport-level chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Per-chat conversation state. Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Unbounded counter; the story reduces it modulo its length.
    pub position: u64,
    /// Empty until the first message or a language command.
    pub language: String,
    /// Responses of the last resolved turn, for re-translation.
    pub last_responses: Vec<Response>,
}

impl Session {
    /// Take the transport's language hint for a chat that has none yet.
    pub fn seed_language(&mut self, hint: Option<&str>) {
        if self.language.is_empty()
            && let Some(hint) = hint
        {
            self.language = hint.to_string();
        }
    }

    /// Whether a new resolution language calls for re-sending the last turn.
    pub fn needs_retranslation(&self, language: &str) -> bool {
        !self.last_responses.is_empty() && self.language != language
    }

    /// Record a resolved turn. `advance` is false for re-translations even
    /// when the resolution itself would advance.
    pub fn apply(&mut self, resolution: &Resolution, responses: Vec<Response>, advance: bool) {
        if advance && resolution.should_advance {
            self.position += 1;
        }
        self.language.clone_from(&resolution.language);
        self.last_responses = responses;
    }

    pub fn reset_position(&mut self) {
        self.position = 0;
    }
}
