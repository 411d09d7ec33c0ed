use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::context::AppContext;
use crate::domain::message::FormattedText;
use crate::error::AppResult;
use crate::services::DigestSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    Sent { users: usize },
    Empty,
}

pub async fn send_digest(
    ctx: &AppContext,
    source: &dyn DigestSource,
    date: NaiveDate,
) -> AppResult<DigestOutcome> {
    let entries = source.daily_summary(date).await?;
    let Some(message) = FormattedText::daily_digest(&entries) else {
        tracing::info!(%date, "no messages today, digest skipped");
        return Ok(DigestOutcome::Empty);
    };

    ctx.notifier
        .notify(&message, ctx.config.telegram.thread_id)
        .await?;
    tracing::info!(%date, users = entries.len(), "sent daily digest");
    Ok(DigestOutcome::Sent {
        users: entries.len(),
    })
}

pub async fn run_daily(ctx: AppContext, source: Arc<dyn DigestSource>) {
    let Some(settings) = ctx.config.digest.clone() else {
        return;
    };
    let (ctx, source) = (&ctx, source.as_ref());
    crate::workflow::schedule::run_daily("daily-digest", settings.run_at, move || async move {
        let today = Local::now().date_naive();
        if let Err(err) = send_digest(ctx, source, today).await {
            tracing::error!(error = %err, "daily digest failed");
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digest::DigestEntry;
    use crate::error::AppError;
    use crate::testing::{
        FixedDigestSource, MemoryCheckpointStore, RecordingNotifier, ScriptedTicketSource,
        context,
    };

    fn ctx_with(notifier: Arc<RecordingNotifier>) -> AppContext {
        context(
            Arc::new(ScriptedTicketSource::default()),
            notifier,
            Arc::new(MemoryCheckpointStore::default()),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 2).unwrap()
    }

    #[tokio::test]
    async fn sends_digest_for_date() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = FixedDigestSource::new(Ok(vec![
            DigestEntry {
                user_name: Some("oksana".to_string()),
                message_count: 9,
            },
            DigestEntry {
                user_name: Some("taras".to_string()),
                message_count: 2,
            },
        ]));

        let outcome = send_digest(&ctx_with(notifier.clone()), &source, date())
            .await
            .unwrap();

        assert_eq!(outcome, DigestOutcome::Sent { users: 2 });
        assert_eq!(*source.queried.lock().unwrap(), vec![date()]);
        let texts = notifier.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("oksana: 9 messages\ntaras: 2 messages"));
    }

    #[tokio::test]
    async fn empty_day_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = FixedDigestSource::new(Ok(Vec::new()));

        let outcome = send_digest(&ctx_with(notifier.clone()), &source, date())
            .await
            .unwrap();

        assert_eq!(outcome, DigestOutcome::Empty);
        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn query_failure_is_reported() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = FixedDigestSource::new(Err(AppError::Digest("refused".to_string())));

        let result = send_digest(&ctx_with(notifier.clone()), &source, date()).await;

        assert!(matches!(result, Err(AppError::Digest(_))));
        assert!(notifier.texts().is_empty());
    }
}
