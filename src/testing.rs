//! In-memory stand-ins for the service traits.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::checkpoint::CheckpointSet;
use crate::domain::digest::DigestEntry;
use crate::domain::message::{FormattedText, ThreadId};
use crate::domain::ticket::{Ticket, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::{
    CheckpointStore, DigestSource, KnownVersionStore, NotifierService, TicketSourceService,
    VersionSource,
};

pub fn config() -> AppConfig {
    let vars = HashMap::from([
        ("API_URL", "https://desk.test:8080/api/v3/requests"),
        ("API_KEY", "key"),
        ("TELEGRAM_BOT_TOKEN", "1:token"),
        ("TELEGRAM_CHAT_ID", "-100"),
        ("THREAD_ID", "5"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
        .expect("test configuration is valid")
}

pub fn ticket(id: &str, subject: &str, requester: &str) -> Ticket {
    Ticket::new(
        TicketId::new(id),
        Some(subject.to_string()),
        Some(requester.to_string()),
    )
}

pub fn ids(values: &[&str]) -> CheckpointSet {
    values.iter().map(|value| TicketId::new(*value)).collect()
}

/// Client that ignores proxy settings from the environment.
pub fn local_http() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Accepts one HTTP connection, answers with `status_line` and `body`, and
/// yields the raw request text.
pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status_line}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request
    });
    (base_url, server)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);

        let Some(head_end) = raw.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if raw.len() >= head_end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

/// Replays scripted responses; an exhausted script returns an empty list.
#[derive(Default)]
pub struct ScriptedTicketSource {
    responses: Mutex<VecDeque<AppResult<Vec<Ticket>>>>,
}

impl ScriptedTicketSource {
    pub fn new(responses: Vec<AppResult<Vec<Ticket>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl TicketSourceService for ScriptedTicketSource {
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Records every delivery attempt; attempts whose text contains one of the
/// `failing` markers are rejected.
#[derive(Default)]
pub struct RecordingNotifier {
    pub attempts: Mutex<Vec<(FormattedText, Option<ThreadId>)>>,
    failing: Vec<String>,
}

impl RecordingNotifier {
    pub fn failing_on(markers: &[&str]) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failing: markers.iter().map(|marker| marker.to_string()).collect(),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.text.clone())
            .collect()
    }
}

#[async_trait]
impl NotifierService for RecordingNotifier {
    async fn notify(&self, message: &FormattedText, thread: Option<ThreadId>) -> AppResult<()> {
        self.attempts.lock().unwrap().push((message.clone(), thread));
        if self.failing.iter().any(|marker| message.text.contains(marker)) {
            return Err(AppError::Delivery("rejected by test notifier".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCheckpointStore {
    pub stored: Mutex<CheckpointSet>,
    pub saves: Mutex<usize>,
    pub fail_saves: bool,
}

impl MemoryCheckpointStore {
    pub fn with(ids: CheckpointSet) -> Self {
        Self {
            stored: Mutex::new(ids),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> CheckpointSet {
        self.stored.lock().unwrap().clone()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> CheckpointSet {
        self.stored()
    }

    fn save(&self, ids: &CheckpointSet) -> AppResult<()> {
        *self.saves.lock().unwrap() += 1;
        if self.fail_saves {
            return Err(AppError::Checkpoint("disk full".to_string()));
        }
        *self.stored.lock().unwrap() = ids.clone();
        Ok(())
    }
}

pub struct FixedVersionSource(pub AppResult<String>);

#[async_trait]
impl VersionSource for FixedVersionSource {
    async fn fetch_version(&self) -> AppResult<String> {
        match &self.0 {
            Ok(version) => Ok(version.clone()),
            Err(err) => Err(AppError::VersionWatch(err.to_string())),
        }
    }
}

#[derive(Default)]
pub struct MemoryVersionStore(pub Mutex<String>);

impl KnownVersionStore for MemoryVersionStore {
    fn load(&self) -> String {
        self.0.lock().unwrap().clone()
    }

    fn save(&self, version: &str) -> AppResult<()> {
        *self.0.lock().unwrap() = version.to_string();
        Ok(())
    }
}

pub struct FixedDigestSource {
    pub entries: AppResult<Vec<DigestEntry>>,
    pub queried: Mutex<Vec<NaiveDate>>,
}

impl FixedDigestSource {
    pub fn new(entries: AppResult<Vec<DigestEntry>>) -> Self {
        Self {
            entries,
            queried: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DigestSource for FixedDigestSource {
    async fn daily_summary(&self, date: NaiveDate) -> AppResult<Vec<DigestEntry>> {
        self.queried.lock().unwrap().push(date);
        match &self.entries {
            Ok(entries) => Ok(entries.clone()),
            Err(err) => Err(AppError::Digest(err.to_string())),
        }
    }
}

pub fn context(
    ticket_source: Arc<dyn TicketSourceService>,
    notifier: Arc<dyn NotifierService>,
    checkpoint_store: Arc<dyn CheckpointStore>,
) -> AppContext {
    AppContext::new(config(), ticket_source, notifier, checkpoint_store)
}
