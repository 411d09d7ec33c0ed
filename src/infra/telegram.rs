use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::TelegramConfig;
use crate::domain::message::{FormattedText, ThreadId};
use crate::error::{AppError, AppResult};
use crate::services::NotifierService;

pub struct TelegramClient {
    http: Client,
    send_message_url: String,
    chat_id: String,
}

impl TelegramClient {
    /// `http` should carry the per-call timeout.
    pub fn new(http: Client, config: &TelegramConfig) -> Self {
        Self {
            http,
            send_message_url: Self::send_message_endpoint(&config.api_url, &config.bot_token),
            chat_id: config.chat_id.clone(),
        }
    }

    fn send_message_endpoint(api_url: &str, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token)
    }
}

#[async_trait]
impl NotifierService for TelegramClient {
    async fn notify(&self, message: &FormattedText, thread: Option<ThreadId>) -> AppResult<()> {
        let request_body = SendMessageRequest::new(&self.chat_id, message, thread);

        // Transport errors from reqwest embed the full URL, which carries the token.
        let response = self
            .http
            .post(&self.send_message_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                AppError::Delivery(format!("failed to call Telegram: {}", err.without_url()))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Delivery(format!(
                "Telegram responded with {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
}

impl<'a> SendMessageRequest<'a> {
    fn new(chat_id: &'a str, message: &'a FormattedText, thread: Option<ThreadId>) -> Self {
        Self {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_str(),
            message_thread_id: thread.map(|thread| thread.0),
        }
    }
}
