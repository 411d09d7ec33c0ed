use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use reqwest::Url;

use crate::domain::message::ThreadId;
use crate::error::{AppError, AppResult};

pub const DEFAULT_ENV_FILE: &str = "key.env";

const DEFAULT_API_KEY_HEADER: &str = "TECHNICIAN_KEY";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_POLL_JITTER_SECS: u64 = 15;
const MAX_POLL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CHECKPOINT_FILE: &str = "processed_ids.json";
const DEFAULT_VERSION_FILE: &str = "version.txt";
const DEFAULT_VERSION_CHECK_AT: &str = "10:00";
const DEFAULT_DIGEST_AT: &str = "00:18";
const DEFAULT_SQL_PORT: u16 = 5432;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub helpdesk: HelpdeskConfig,
    pub telegram: TelegramConfig,
    pub poll: PollConfig,
    pub http_timeout: Duration,
    pub version_watch: Option<VersionWatchConfig>,
    pub digest: Option<DigestConfig>,
}

#[derive(Debug, Clone)]
pub struct HelpdeskConfig {
    pub api_url: Url,
    pub api_key: String,
    pub api_key_header: String,
    /// Base of the ticket web view used for deep links.
    pub web_url: String,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub thread_id: Option<ThreadId>,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_jitter: Duration,
    pub checkpoint_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct VersionWatchConfig {
    pub page_url: String,
    pub version_file: PathBuf,
    pub check_at: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub run_at: NaiveTime,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let api_url_raw = vars.required("API_URL")?;
        let api_url = Url::parse(&api_url_raw)
            .map_err(|err| AppError::Configuration(format!("invalid API_URL: {err}")))?;
        let web_url = vars
            .optional("HELPDESK_WEB_URL")
            .unwrap_or_else(|| api_url.origin().ascii_serialization());

        let helpdesk = HelpdeskConfig {
            api_key: vars.required("API_KEY")?,
            api_key_header: vars
                .optional("API_KEY_HEADER")
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            web_url: web_url.trim_end_matches('/').to_string(),
            accept_invalid_certs: vars.flag("HELPDESK_INSECURE_TLS")?,
            api_url,
        };

        let telegram = TelegramConfig {
            api_url: vars
                .optional("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            bot_token: vars.required("TELEGRAM_BOT_TOKEN")?,
            chat_id: vars.required("TELEGRAM_CHAT_ID")?,
            thread_id: vars.parsed::<i64>("THREAD_ID")?.map(ThreadId),
        };

        let interval_secs = vars
            .parsed("POLL_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if interval_secs == 0 || interval_secs > MAX_POLL_SECS {
            return Err(AppError::Configuration(format!(
                "POLL_INTERVAL_SECS must be between 1 and {MAX_POLL_SECS}"
            )));
        }
        let jitter_secs = vars
            .parsed("POLL_JITTER_SECS")?
            .unwrap_or(DEFAULT_POLL_JITTER_SECS);
        if jitter_secs > MAX_POLL_SECS {
            return Err(AppError::Configuration(format!(
                "POLL_JITTER_SECS must be at most {MAX_POLL_SECS}"
            )));
        }

        let poll = PollConfig {
            interval: Duration::from_secs(interval_secs),
            max_jitter: Duration::from_secs(jitter_secs),
            checkpoint_path: vars
                .optional("CHECKPOINT_FILE")
                .unwrap_or_else(|| DEFAULT_CHECKPOINT_FILE.to_string())
                .into(),
        };

        let timeout_secs = vars
            .parsed("HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::Configuration(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let version_watch = match vars.optional("MEDOC_URL") {
            Some(page_url) => Some(VersionWatchConfig {
                page_url,
                version_file: vars
                    .optional("VERSION_FILE")
                    .unwrap_or_else(|| DEFAULT_VERSION_FILE.to_string())
                    .into(),
                check_at: vars.time_of_day("VERSION_CHECK_AT", DEFAULT_VERSION_CHECK_AT)?,
            }),
            None => None,
        };

        let digest = match (
            vars.optional("SQL_ADRES"),
            vars.optional("SQL_USER"),
            vars.optional("SQL_DATABASE"),
        ) {
            (Some(host), Some(user), Some(database)) => Some(DigestConfig {
                host,
                port: vars.parsed("SQL_PORT")?.unwrap_or(DEFAULT_SQL_PORT),
                user,
                password: vars.optional("SQL_PASSWORD"),
                database,
                run_at: vars.time_of_day("DIGEST_AT", DEFAULT_DIGEST_AT)?,
            }),
            _ => None,
        };

        Ok(Self {
            helpdesk,
            telegram,
            poll,
            http_timeout: Duration::from_secs(timeout_secs),
            version_watch,
            digest,
        })
    }

    /// One-line description of the effective settings with secrets masked.
    pub fn summary(&self) -> String {
        format!(
            "api_url={} api_key={} chat_id={} thread_id={} bot_token={} \
             interval={}s jitter<={}s checkpoint={} version_watch={} digest={}",
            self.helpdesk.api_url,
            mask_secret(&self.helpdesk.api_key),
            self.telegram.chat_id,
            self.telegram
                .thread_id
                .map(|thread| thread.0.to_string())
                .unwrap_or_else(|| "<not set>".to_string()),
            mask_secret(&self.telegram.bot_token),
            self.poll.interval.as_secs(),
            self.poll.max_jitter.as_secs(),
            self.poll.checkpoint_path.display(),
            self.version_watch
                .as_ref()
                .map(|watch| format!("daily at {}", watch.check_at.format("%H:%M")))
                .unwrap_or_else(|| "off".to_string()),
            self.digest
                .as_ref()
                .map(|digest| format!("daily at {}", digest.run_at.format("%H:%M")))
                .unwrap_or_else(|| "off".to_string()),
        )
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> AppResult<String> {
        self.optional(key)
            .ok_or_else(|| AppError::Configuration(format!("{key} is not set")))
    }

    fn parsed<T>(&self, key: &str) -> AppResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|value| {
                value.parse::<T>().map_err(|err| {
                    AppError::Configuration(format!("invalid {key} '{value}': {err}"))
                })
            })
            .transpose()
    }

    fn flag(&self, key: &str) -> AppResult<bool> {
        match self.optional(key) {
            None => Ok(false),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(AppError::Configuration(format!(
                    "invalid {key} '{value}': expected true or false"
                ))),
            },
        }
    }

    fn time_of_day(&self, key: &str, default: &str) -> AppResult<NaiveTime> {
        let value = self.optional(key).unwrap_or_else(|| default.to_string());
        NaiveTime::parse_from_str(&value, "%H:%M").map_err(|err| {
            AppError::Configuration(format!("invalid {key} '{value}', expected HH:MM: {err}"))
        })
    }
}

fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 6 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{prefix}***{suffix}")
    } else {
        "***".to_string()
    }
}
