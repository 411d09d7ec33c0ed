use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{ACCEPT, HeaderName, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;

use crate::config::HelpdeskConfig;
use crate::domain::ticket::{Ticket, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::TicketSourceService;

/// Client for the helpdesk `requests` endpoint.
pub struct HelpdeskClient {
    http: Client,
    api_url: Url,
    key_header: HeaderName,
    key_value: HeaderValue,
}

impl HelpdeskClient {
    pub fn new(config: &HelpdeskConfig, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("failed to build helpdesk client: {err}"))
            })?;
        Self::with_http(http, config)
    }

    /// `http` is used as is; TLS and timeout settings are the caller's.
    pub fn with_http(http: Client, config: &HelpdeskConfig) -> AppResult<Self> {
        let key_header = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|err| {
            AppError::Configuration(format!(
                "invalid API key header name '{}': {err}",
                config.api_key_header
            ))
        })?;
        let mut key_value = HeaderValue::from_str(&config.api_key)
            .map_err(|err| AppError::Configuration(format!("invalid API key: {err}")))?;
        key_value.set_sensitive(true);

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            key_header,
            key_value,
        })
    }
}

#[async_trait]
impl TicketSourceService for HelpdeskClient {
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>> {
        let response = self
            .http
            .get(self.api_url.clone())
            .header(self.key_header.clone(), self.key_value.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::TicketSource(format!("failed to call helpdesk: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::TicketSource(format!(
                "helpdesk responded with {status}: {body}"
            )));
        }

        let body = response.text().await.map_err(|err| {
            AppError::TicketSource(format!("failed to read helpdesk response: {err}"))
        })?;
        parse_requests(&body)
    }
}

#[derive(Deserialize)]
struct RequestsResponse {
    #[serde(default)]
    requests: Vec<Value>,
}

/// Parses a `requests` listing. Records are read field by field so that a
/// partially filled record still yields a ticket; records without an `id` are
/// dropped.
pub fn parse_requests(body: &str) -> AppResult<Vec<Ticket>> {
    let payload: RequestsResponse = serde_json::from_str(body).map_err(|err| {
        AppError::TicketSource(format!("failed to parse helpdesk response: {err}"))
    })?;

    let total = payload.requests.len();
    let tickets: Vec<Ticket> = payload.requests.iter().filter_map(ticket_from_value).collect();
    if tickets.len() < total {
        tracing::warn!(
            skipped = total - tickets.len(),
            "helpdesk returned requests without an id"
        );
    }
    Ok(tickets)
}

fn ticket_from_value(value: &Value) -> Option<Ticket> {
    let id = TicketId::from_json(value.get("id")?)?;
    let subject = value
        .get("subject")
        .and_then(Value::as_str)
        .map(str::to_string);
    let requester = value
        .get("requester")
        .and_then(|requester| requester.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(Ticket::new(id, subject, requester))
}
