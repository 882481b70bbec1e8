use super::trim_history;
use crate::models::{Conversation, Role, Snapshot, Turn};
use tracing::debug;

/// Limits applied to every history in the table.
#[derive(Debug, Clone)]
pub struct HistoryPolicy {
    pub persona_prompt: String,
    pub message_limit: usize,
    /// Re-trim oversized histories during purge sweeps.
    pub trim_on_purge: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: usize,
    pub trimmed: usize,
}

impl PurgeReport {
    pub fn changed(&self) -> bool {
        self.removed > 0 || self.trimmed > 0
    }
}

/// In-memory map of user identity to conversation.
///
/// Every mutation sets the dirty flag; [`ConversationTable::take_dirty_snapshot`]
/// clears it when the caller is about to write the table out.
#[derive(Debug, Clone)]
pub struct ConversationTable {
    conversations: Snapshot,
    policy: HistoryPolicy,
    dirty: bool,
}

impl ConversationTable {
    pub fn new(policy: HistoryPolicy) -> Self {
        Self {
            conversations: Snapshot::new(),
            policy,
            dirty: false,
        }
    }

    /// Build a table from a loaded snapshot. Entries that lost their persona
    /// turn get it back. Oversized histories are left alone until their next
    /// append, or the next purge when `trim_on_purge` is set.
    pub fn from_snapshot(snapshot: Snapshot, policy: HistoryPolicy) -> Self {
        let mut table = Self {
            conversations: snapshot,
            policy,
            dirty: false,
        };

        for (user_id, conversation) in table.conversations.iter_mut() {
            if !conversation.has_persona() {
                conversation
                    .history
                    .insert(0, Turn::system(table.policy.persona_prompt.as_str()));
                debug!(user_id = %user_id, "restored missing persona turn");
                table.dirty = true;
            }
        }

        table
    }

    pub fn policy(&self) -> &HistoryPolicy {
        &self.policy
    }

    pub fn get_or_create(&mut self, user_id: &str, now: i64) -> &Conversation {
        self.entry(user_id, now)
    }

    fn entry(&mut self, user_id: &str, now: i64) -> &mut Conversation {
        if !self.conversations.contains_key(user_id) {
            self.dirty = true;
        }
        let persona = &self.policy.persona_prompt;
        self.conversations
            .entry(user_id.to_string())
            .or_insert_with(|| Conversation::new(persona, now))
    }

    /// Append a turn, refresh the activity time, then drop the oldest
    /// non-system turns until the history fits the limit.
    pub fn append_turn(&mut self, user_id: &str, role: Role, content: &str, now: i64) {
        let limit = self.policy.message_limit;
        let conversation = self.entry(user_id, now);
        conversation.history.push(Turn::new(role, content));
        conversation.last_interaction = now;
        trim_history(&mut conversation.history, limit);
        self.dirty = true;
    }

    /// Remove every conversation idle for longer than `inactivity_limit_ms`.
    pub fn purge(&mut self, now: i64, inactivity_limit_ms: i64) -> PurgeReport {
        let before = self.conversations.len();
        self.conversations
            .retain(|_, conversation| !conversation.is_inactive(now, inactivity_limit_ms));

        let mut report = PurgeReport {
            removed: before - self.conversations.len(),
            trimmed: 0,
        };

        if self.policy.trim_on_purge {
            let limit = self.policy.message_limit;
            for conversation in self.conversations.values_mut() {
                if trim_history(&mut conversation.history, limit) > 0 {
                    report.trimmed += 1;
                }
            }
        }

        if report.changed() {
            self.dirty = true;
        }
        report
    }

    pub fn get(&self, user_id: &str) -> Option<&Conversation> {
        self.conversations.get(user_id)
    }

    pub fn history(&self, user_id: &str) -> Option<&[Turn]> {
        self.conversations.get(user_id).map(|c| c.history.as_slice())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.conversations
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clone the table for writing if anything changed since the last call.
    pub fn take_dirty_snapshot(&mut self) -> Option<Snapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.conversations.clone())
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
