use crate::context::AppContext;
use crate::domain::checkpoint::CheckpointSet;
use crate::domain::message::FormattedText;
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::workflow::schedule::jittered_delay;

/// Outcome of one fetch, diff, notify and persist pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetch_failed: bool,
    pub fetched: usize,
    pub new: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
    pub persisted: bool,
}

/// Moves tickets whose id is not yet checkpointed into the returned batch,
/// recording their ids. Upstream order is kept and repeated ids within one
/// listing are admitted once.
pub fn admit_new(checkpoint: &mut CheckpointSet, tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets
        .into_iter()
        .filter(|ticket| checkpoint.insert(ticket.id.clone()))
        .collect()
}

pub async fn run_cycle(ctx: &AppContext, checkpoint: &mut CheckpointSet) -> CycleReport {
    let mut report = CycleReport::default();

    let tickets = match ctx.ticket_source.fetch_tickets().await {
        Ok(tickets) => tickets,
        Err(err) => {
            tracing::warn!(error = %err, "ticket fetch failed, nothing to do this cycle");
            report.fetch_failed = true;
            Vec::new()
        }
    };
    report.fetched = tickets.len();

    let fresh = admit_new(checkpoint, tickets);
    report.new = fresh.len();
    if !fresh.is_empty() {
        tracing::info!(count = fresh.len(), "found new tickets");
    }

    let thread = ctx.config.telegram.thread_id;
    for ticket in &fresh {
        let link = ticket.web_link(&ctx.config.helpdesk.web_url);
        let message = FormattedText::new_ticket(ticket, &link);
        match ctx.notifier.notify(&message, thread).await {
            Ok(()) => {
                report.delivered += 1;
                tracing::info!(ticket = %ticket.id, "announced ticket");
            }
            Err(err) => {
                report.failed_deliveries += 1;
                tracing::error!(ticket = %ticket.id, error = %err, "failed to announce ticket");
            }
        }
    }

    match ctx.checkpoint_store.save(checkpoint) {
        Ok(()) => report.persisted = true,
        Err(err) => {
            tracing::error!(
                error = %err,
                "failed to persist checkpoint, keeping in-memory state"
            );
        }
    }

    report
}

/// Loads the checkpoint and polls until the process is stopped.
pub async fn run_forever(ctx: &AppContext) -> AppResult<()> {
    let mut checkpoint = ctx.checkpoint_store.load();
    let poll = &ctx.config.poll;

    loop {
        let report = run_cycle(ctx, &mut checkpoint).await;
        tracing::debug!(?report, known = checkpoint.len(), "poll cycle finished");

        let delay = jittered_delay(poll.interval, poll.max_jitter, &mut rand::thread_rng());
        tracing::info!(seconds = delay.as_secs(), "waiting before next poll");
        tokio::time::sleep(delay).await;
    }
}

pub async fn run_once(ctx: &AppContext) -> CycleReport {
    let mut checkpoint = ctx.checkpoint_store.load();
    let report = run_cycle(ctx, &mut checkpoint).await;
    tracing::info!(?report, known = checkpoint.len(), "single poll cycle finished");
    report
}
