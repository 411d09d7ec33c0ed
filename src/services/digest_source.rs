use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::digest::DigestEntry;
use crate::error::AppResult;

#[async_trait]
pub trait DigestSource: Send + Sync {
    /// Message counts per user for `date`, busiest first.
    async fn daily_summary(&self, date: NaiveDate) -> AppResult<Vec<DigestEntry>>;
}
