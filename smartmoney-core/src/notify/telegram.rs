//! Telegram Bot API channel.
//!
//! `POST https://api.telegram.org/bot<token>/sendMessage` with
//! `{chat_id, text, parse_mode: "HTML"}`. Delivered iff the API answers 200.

use std::time::Duration;

use serde::Serialize;

use super::{Notifier, NotifyError};

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the destination chat id.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Telegram channel. Missing credentials make every send fail with
/// `NotConfigured` without touching the network.
pub struct TelegramNotifier {
    client: Option<reqwest::blocking::Client>,
    token: String,
    chat_id: String,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>, timeout: Duration) -> Self {
        let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build Telegram HTTP client");
                None
            }
        };
        Self {
            client,
            token: token.into(),
            chat_id: chat_id.into(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }

    /// Credentials from `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`; empty when unset.
    pub fn from_env(timeout: Duration) -> Self {
        let token = std::env::var(TOKEN_ENV).unwrap_or_default();
        let chat_id = std::env::var(CHAT_ID_ENV).unwrap_or_default();
        Self::new(token, chat_id, timeout)
    }

    /// Point the channel at a different API host.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        if !self.is_configured() {
            return Err(NotifyError::NotConfigured(format!(
                "set {TOKEN_ENV} and {CHAT_ID_ENV}"
            )));
        }
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| NotifyError::Transport("HTTP client unavailable".into()))?;

        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };
        let resp = client
            .post(self.endpoint())
            .json(&body)
            .send()
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
