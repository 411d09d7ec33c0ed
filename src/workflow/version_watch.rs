use crate::context::{AppContext, VersionWatchServices};
use crate::domain::message::FormattedText;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheckOutcome {
    Current(String),
    Updated { previous: String, current: String },
}

/// Compares the published version with the last known one and announces a
/// change. The new version is recorded before the announcement goes out.
pub async fn check_once(
    ctx: &AppContext,
    watch: &VersionWatchServices,
) -> AppResult<VersionCheckOutcome> {
    let current = watch.source.fetch_version().await?;
    let previous = watch.known_version.load();

    if current == previous {
        tracing::info!(version = %current, "vendor version is current");
        return Ok(VersionCheckOutcome::Current(current));
    }

    if let Err(err) = watch.known_version.save(&current) {
        tracing::error!(error = %err, "failed to record new vendor version");
    }

    let message = FormattedText::version_released(&current);
    if let Err(err) = ctx.notifier.notify(&message, ctx.config.telegram.thread_id).await {
        tracing::error!(version = %current, error = %err, "failed to announce vendor version");
    } else {
        tracing::info!(version = %current, previous = %previous, "announced vendor version");
    }

    Ok(VersionCheckOutcome::Updated { previous, current })
}

pub async fn run_daily(ctx: AppContext, watch: VersionWatchServices) {
    let Some(settings) = ctx.config.version_watch.clone() else {
        return;
    };
    let (ctx, watch) = (&ctx, &watch);
    crate::workflow::schedule::run_daily("version-watch", settings.check_at, move || async move {
        if let Err(err) = check_once(ctx, watch).await {
            tracing::error!(error = %err, "vendor version check failed");
        }
    })
    .await;
}
