use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::DigestConfig;
use crate::domain::digest::DigestEntry;
use crate::error::{AppError, AppResult};
use crate::services::DigestSource;

const DAILY_SUMMARY_QUERY: &str = "
    SELECT user_name, COUNT(*) AS message_count
    FROM slack_messages
    WHERE date_normal = $1
    GROUP BY user_name
    ORDER BY message_count DESC
";

/// Reads message statistics from the chat archive database.
pub struct PgDigestSource {
    db: PgPool,
}

impl PgDigestSource {
    /// Connections are opened on first use.
    pub fn new(config: &DigestConfig, timeout: Duration) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        let db = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_lazy_with(options);

        Self { db }
    }
}

#[async_trait]
impl DigestSource for PgDigestSource {
    async fn daily_summary(&self, date: NaiveDate) -> AppResult<Vec<DigestEntry>> {
        let rows = sqlx::query_as::<_, (Option<String>, i64)>(DAILY_SUMMARY_QUERY)
            .bind(date)
            .fetch_all(&self.db)
            .await
            .map_err(|err| AppError::Digest(format!("daily summary query failed: {err}")))?;

        Ok(rows
            .into_iter()
            .map(|(user_name, message_count)| DigestEntry {
                user_name,
                message_count,
            })
            .collect())
    }
}
