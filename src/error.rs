use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("ticket source error: {0}")]
    TicketSource(String),
    #[error("delivery error: {0}")]
    Delivery(String),
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
    #[error("version watch error: {0}")]
    VersionWatch(String),
    #[error("digest error: {0}")]
    Digest(String),
    #[error("background task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
