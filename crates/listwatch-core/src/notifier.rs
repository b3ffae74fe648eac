use crate::{ChatId, Error, MarkupMode, Result, Secret};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination chat
    pub chat_id: ChatId,
    /// Message body, already rendered for `mode`
    pub text: String,
    /// Markup the body is written in
    pub mode: MarkupMode,
    /// Suppress the link preview under the message
    pub disable_link_preview: bool,
}

/// Delivery channel for notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. Failures are reported as [`Error::Delivery`] or
    /// [`Error::Network`] and never retried here.
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// Telegram Bot API client for `sendMessage`.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: Secret,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Create a client against `api_base` (normally `https://api.telegram.org`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(api_base: impl Into<String>, token: Secret) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("listwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token.expose())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let body = SendMessageRequest {
            chat_id: &message.chat_id,
            text: &message.text,
            parse_mode: message.mode.parse_mode(),
            disable_web_page_preview: message.disable_link_preview,
        };

        // The token is part of the path, so reqwest errors must not be shown
        // with their URL.
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;
        let parsed = serde_json::from_str::<ApiResponse>(&text).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                debug!(chat_id = %message.chat_id, "Telegram accepted message");
                Ok(())
            },
            Some(api) => Err(Error::Delivery(format!(
                "Telegram rejected message ({status}): {}",
                api.description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(Error::Delivery(format!(
                "Telegram returned {status} with an unreadable body"
            ))),
        }
    }
}
