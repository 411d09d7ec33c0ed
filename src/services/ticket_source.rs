use async_trait::async_trait;

use crate::domain::ticket::Ticket;
use crate::error::AppResult;

#[async_trait]
pub trait TicketSourceService: Send + Sync {
    /// Current tickets in upstream order. One request per call.
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>>;
}
