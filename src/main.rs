mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use reqwest::Client;

use crate::cmd::relay::{self, RelayArgs};
use crate::config::{AppConfig, DEFAULT_ENV_FILE};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::checkpoint_file::JsonFileCheckpointStore;
use crate::infra::helpdesk::HelpdeskClient;
use crate::infra::postgres::PgDigestSource;
use crate::infra::telegram::TelegramClient;
use crate::infra::version_page::{VersionFile, VersionPageClient};

#[derive(Parser)]
#[command(
    name = "helpdesk-relay",
    author,
    version,
    about = "Announces new helpdesk tickets in a Telegram chat"
)]
struct Cli {
    /// Dotenv file read before the process environment.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let env_file_status = load_env_file(&cli.env_file);
    logging::init_logging();
    env_file_status.log(&cli.env_file);

    if let Err(error) = run(cli).await {
        tracing::error!(%error, "relay stopped");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::from_env()?;
    tracing::info!(settings = %config.summary(), "configuration loaded");

    let context = build_context(config)?;
    relay::run(context, RelayArgs { once: cli.once }).await
}

fn build_context(config: AppConfig) -> AppResult<AppContext> {
    let http = Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;

    let ticket_source = Arc::new(HelpdeskClient::new(&config.helpdesk, config.http_timeout)?);
    let notifier = Arc::new(TelegramClient::new(http.clone(), &config.telegram));
    let checkpoint_store = Arc::new(JsonFileCheckpointStore::new(
        config.poll.checkpoint_path.clone(),
    ));

    let version_watch = config.version_watch.clone();
    let digest = config.digest.clone();
    let http_timeout = config.http_timeout;

    let mut context = AppContext::new(config, ticket_source, notifier, checkpoint_store);
    if let Some(watch) = version_watch {
        context = context.with_version_watch(
            Arc::new(VersionPageClient::new(http, watch.page_url)),
            Arc::new(VersionFile::new(watch.version_file)),
        );
    }
    if let Some(digest) = digest {
        context = context.with_digest_source(Arc::new(PgDigestSource::new(&digest, http_timeout)));
    }

    Ok(context)
}

enum EnvFileStatus {
    Loaded,
    Missing,
    Invalid(dotenvy::Error),
}

impl EnvFileStatus {
    fn log(&self, path: &Path) {
        match self {
            EnvFileStatus::Loaded => tracing::info!(path = %path.display(), "loaded env file"),
            EnvFileStatus::Missing => {
                tracing::debug!(path = %path.display(), "no env file, using process environment")
            }
            EnvFileStatus::Invalid(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable env file")
            }
        }
    }
}

/// Must run before logging is initialised so the file can set the log filter.
fn load_env_file(path: &Path) -> EnvFileStatus {
    match dotenvy::from_path(path) {
        Ok(()) => EnvFileStatus::Loaded,
        Err(err) if err.not_found() => EnvFileStatus::Missing,
        Err(err) => EnvFileStatus::Invalid(err),
    }
}
