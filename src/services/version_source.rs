use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn fetch_version(&self) -> AppResult<String>;
}

pub trait KnownVersionStore: Send + Sync {
    /// Empty string when nothing has been recorded yet.
    fn load(&self) -> String;
    fn save(&self, version: &str) -> AppResult<()>;
}
