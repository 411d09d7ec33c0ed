use async_trait::async_trait;

use crate::domain::message::{FormattedText, ThreadId};
use crate::error::AppResult;

#[async_trait]
pub trait NotifierService: Send + Sync {
    async fn notify(&self, message: &FormattedText, thread: Option<ThreadId>) -> AppResult<()>;
}
