//! Telegram Bot API notifier.
//!
//! Alerts go out through `sendMessage`; `getMe` verifies the token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Notifier;
use crate::error::AlertError;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram connection settings as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub enabled: bool,
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            token: None,
            chat_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

/// A sender for pushing alerts via the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramNotifier {
    /// Build a notifier from settings, failing when credentials are missing.
    pub fn from_settings(settings: &TelegramSettings) -> Result<Self, AlertError> {
        let token = settings
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AlertError::NotConfigured("missing bot token"))?;
        let chat_id = settings
            .chat_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AlertError::NotConfigured("missing chat id"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// The first ten characters of the token, for display.
    pub fn masked_token(&self) -> String {
        let prefix: String = self.token.chars().take(10).collect();
        format!("{}...", prefix)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Call `getMe` to verify the token is accepted.
    ///
    /// Returns the bot's username when the API reports one.
    pub async fn check_connection(&self) -> Result<Option<String>, AlertError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        let me: GetMeResponse = ensure_success(response).await?.json().await?;
        Ok(me.result.and_then(|bot| bot.username))
    }
}

#[derive(Deserialize)]
struct GetMeResponse {
    result: Option<BotUser>,
}

#[derive(Deserialize)]
struct BotUser {
    username: Option<String>,
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AlertError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    Err(AlertError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        let payload = TelegramMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("telegram chat {}", self.chat_id)
    }
}
