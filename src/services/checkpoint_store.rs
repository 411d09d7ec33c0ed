use crate::domain::checkpoint::CheckpointSet;
use crate::error::AppResult;

pub trait CheckpointStore: Send + Sync {
    /// Never fails: an absent or unreadable record yields an empty set.
    fn load(&self) -> CheckpointSet;
    /// Overwrites the record with the full set.
    fn save(&self, ids: &CheckpointSet) -> AppResult<()>;
}
