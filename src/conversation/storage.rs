use crate::error::StoreError;
use crate::models::Snapshot;

/// Trait for snapshot storage backends
pub trait ConversationStore: Send + Sync {
    /// Load the last saved snapshot. A store that has never been written
    /// returns an empty snapshot.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Replace the stored snapshot as a single atomic write.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Remove everything this store has written.
    fn clear(&self) -> Result<(), StoreError>;
}
