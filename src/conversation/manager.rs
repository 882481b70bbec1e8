use super::locks::UserLocks;
use super::storage::ConversationStore;
use super::trim_history;
use super::table::{ConversationTable, HistoryPolicy, PurgeReport};
use crate::error::StoreError;
use crate::models::{Role, Snapshot, Turn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

/// Owned conversation state shared by every event handler.
///
/// The table mutex is only held for synchronous sections. Anything that
/// spans an await (a model call) must hold the per-user guard from
/// [`ConversationManager::lock_user`] instead. Turns are committed one
/// whole exchange at a time.
pub struct ConversationManager {
    table: Mutex<ConversationTable>,
    store: Arc<dyn ConversationStore>,
    locks: UserLocks,
    write_gate: tokio::sync::Mutex<()>,
}

impl ConversationManager {
    /// Load the table from `store`. A corrupt or unreadable snapshot is
    /// logged and replaced by an empty table.
    pub fn open(store: Arc<dyn ConversationStore>, policy: HistoryPolicy) -> Self {
        let table = match store.load() {
            Ok(snapshot) => {
                info!(conversations = snapshot.len(), "loaded conversation memory");
                ConversationTable::from_snapshot(snapshot, policy)
            }
            Err(e) => {
                warn!(error = %e, "could not read conversation memory, starting empty");
                ConversationTable::new(policy)
            }
        };
        Self::with_table(table, store)
    }

    pub fn with_table(table: ConversationTable, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            table: Mutex::new(table),
            store,
            locks: UserLocks::new(),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn table(&self) -> MutexGuard<'_, ConversationTable> {
        // A panic elsewhere must not take the whole bot down with it.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn lock_user(&self, user_id: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(user_id).await
    }

    /// History the model should see for a new user message: the stored
    /// turns plus `content`, trimmed to the limit. Records nothing.
    pub fn history_with_user_turn(&self, user_id: &str, content: &str) -> Vec<Turn> {
        let table = self.table();
        let policy = table.policy();
        let mut history = match table.history(user_id) {
            Some(history) => history.to_vec(),
            None => vec![Turn::system(policy.persona_prompt.as_str())],
        };
        history.push(Turn::user(content));
        trim_history(&mut history, policy.message_limit);
        history
    }

    /// Append a user message and its reply under one table lock, so no
    /// snapshot ever holds a user turn without the answer.
    pub fn record_exchange(
        &self,
        user_id: &str,
        user_content: &str,
        asked_at: i64,
        reply: &str,
        replied_at: i64,
    ) {
        let mut table = self.table();
        table.append_turn(user_id, Role::User, user_content, asked_at);
        table.append_turn(user_id, Role::Assistant, reply, replied_at);
    }

    pub fn history(&self, user_id: &str) -> Option<Vec<Turn>> {
        self.table().history(user_id).map(<[Turn]>::to_vec)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.table().snapshot().clone()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.table().is_dirty()
    }

    /// Drop idle conversations and any per-user locks nobody is using.
    pub fn purge(&self, now: i64, inactivity_limit_ms: i64) -> PurgeReport {
        let report = self.table().purge(now, inactivity_limit_ms);
        let locks = self.locks.prune_idle();
        if report.changed() {
            info!(
                removed = report.removed,
                trimmed = report.trimmed,
                "purged conversation memory"
            );
        }
        debug!(locks, "pruned idle user locks");
        report
    }

    /// Write the table out if it changed. Returns whether a write happened.
    pub async fn flush(&self) -> Result<bool, StoreError> {
        self.write(false).await
    }

    /// Write the table out unconditionally. Used at shutdown.
    pub async fn flush_now(&self) -> Result<(), StoreError> {
        self.write(true).await.map(|_| ())
    }

    async fn write(&self, force: bool) -> Result<bool, StoreError> {
        let _gate = self.write_gate.lock().await;

        let snapshot = {
            let mut table = self.table();
            match table.take_dirty_snapshot() {
                Some(snapshot) => snapshot,
                None if force => table.snapshot().clone(),
                None => return Ok(false),
            }
        };

        let store = Arc::clone(&self.store);
        let conversations = snapshot.len();
        let result = tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))
            .and_then(|saved| saved);

        match result {
            Ok(()) => {
                debug!(conversations, "flushed conversation memory");
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, "failed to save conversation memory");
                self.table().mark_dirty();
                Err(e)
            }
        }
    }
}
