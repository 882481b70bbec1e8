use super::turn::{Role, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's bounded history plus the time of their last message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub history: Vec<Turn>,
    /// Epoch milliseconds.
    #[serde(rename = "lastInteraction")]
    pub last_interaction: i64,
}

impl Conversation {
    /// Seed a conversation with the persona turn.
    pub fn new(persona_prompt: &str, now: i64) -> Self {
        Self {
            history: vec![Turn::system(persona_prompt)],
            last_interaction: now,
        }
    }

    pub fn has_persona(&self) -> bool {
        self.history.first().map(|t| t.role) == Some(Role::System)
    }

    pub fn is_inactive(&self, now: i64, inactivity_limit_ms: i64) -> bool {
        now - self.last_interaction > inactivity_limit_ms
    }
}

/// The persisted form of the whole table: user identity to conversation.
pub type Snapshot = HashMap<String, Conversation>;
