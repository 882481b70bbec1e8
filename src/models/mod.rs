mod conversation;
mod turn;

pub use conversation::{Conversation, Snapshot};
pub use turn::{Role, Turn};

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
