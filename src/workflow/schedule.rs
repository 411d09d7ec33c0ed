use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use rand::Rng;

/// Poll delay: `base` plus a uniform jitter of 1..=`max_jitter` whole seconds.
/// A zero `max_jitter` yields `base` exactly.
pub fn jittered_delay<R: Rng + ?Sized>(
    base: Duration,
    max_jitter: Duration,
    rng: &mut R,
) -> Duration {
    let max_secs = max_jitter.as_secs();
    if max_secs == 0 {
        return base;
    }
    base.saturating_add(Duration::from_secs(rng.gen_range(1..=max_secs)))
}

/// Time from `now` until the next occurrence of `at`, strictly in the future.
pub fn until_next_daily(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Runs `job` every day at `at`, local time, forever.
pub async fn run_daily<F, Fut>(task: &'static str, at: NaiveTime, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let wait = until_next_daily(Local::now().naive_local(), at);
        tracing::info!(task, seconds = wait.as_secs(), "next daily run scheduled");
        tokio::time::sleep(wait).await;
        job().await;
    }
}
