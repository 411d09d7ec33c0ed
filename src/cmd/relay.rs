use tokio::task::JoinSet;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::{digest, poll, version_watch};

#[derive(Debug, Clone)]
pub struct RelayArgs {
    pub once: bool,
}

/// Runs the poll loop and any enabled daily tasks until interrupted. Returns an
/// error as soon as one of them stops on its own.
pub async fn run(ctx: AppContext, args: RelayArgs) -> AppResult<()> {
    if args.once {
        poll::run_once(&ctx).await;
        return Ok(());
    }

    let mut tasks = JoinSet::new();

    let poll_ctx = ctx.clone();
    tasks.spawn(async move { ("ticket-poll", poll::run_forever(&poll_ctx).await) });

    if let Some(watch) = ctx.version_watch.clone() {
        let watch_ctx = ctx.clone();
        tasks.spawn(async move {
            version_watch::run_daily(watch_ctx, watch).await;
            ("version-watch", Ok(()))
        });
    }

    if let Some(source) = ctx.digest_source.clone() {
        let digest_ctx = ctx.clone();
        tasks.spawn(async move {
            digest::run_daily(digest_ctx, source).await;
            ("daily-digest", Ok(()))
        });
    }

    tracing::info!(tasks = tasks.len(), "relay started");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
        Some(joined) = tasks.join_next() => match joined {
            Ok((task, Ok(()))) => Err(AppError::Task(format!("{task} exited unexpectedly"))),
            Ok((task, Err(err))) => Err(AppError::Task(format!("{task}: {err}"))),
            Err(err) => Err(AppError::Task(err.to_string())),
        },
    }
}
