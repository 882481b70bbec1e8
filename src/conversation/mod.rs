mod filesystem;
mod locks;
mod manager;
mod storage;
mod table;

pub use filesystem::JsonFileStore;
pub use locks::UserLocks;
pub use manager::ConversationManager;
pub use storage::ConversationStore;
pub use table::{ConversationTable, HistoryPolicy, PurgeReport};

use crate::models::Turn;

/// Drop turns from index 1 onward until `history` fits `limit`.
///
/// The persona turn at index 0 always survives, as does the relative order
/// of the turns that remain. Returns how many turns were dropped.
pub fn trim_history(history: &mut Vec<Turn>, limit: usize) -> usize {
    let limit = limit.max(1);
    if history.len() <= limit {
        return 0;
    }
    let excess = history.len() - limit;
    history.drain(1..1 + excess);
    excess
}
