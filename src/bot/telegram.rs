//! Telegram Bot API transport
//!
//! Long-polls `getUpdates`, hands every text message to the command
//! handler on its own task and posts the reply with `sendMessage`.

use super::{addressed_elsewhere, CommandHandler};
use crate::config::TelegramConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed getUpdates call
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// The bot's own account, from `getMe`
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Bot API client
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: String,
    bot_token: SecretString,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url,
            self.bot_token.expose_secret(),
            method
        )
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&payload)
            .timeout(Duration::from_secs(self.poll_timeout_secs + 10))
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<Vec<Update>> = response.json().await?;
        if !body.ok {
            anyhow::bail!(
                "Telegram getUpdates error: {} - {}",
                status,
                body.description.unwrap_or_default()
            );
        }

        Ok(body.result.unwrap_or_default())
    }

    /// Username of the bot behind the token
    pub async fn get_me(&self) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<BotUser> = response.json().await?;
        if !body.ok {
            anyhow::bail!(
                "Telegram getMe error: {} - {}",
                status,
                body.description.unwrap_or_default()
            );
        }

        Ok(body.result.and_then(|user| user.username))
    }

    /// Send a plain-text message
    pub async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error: {} - {}", status, body);
        }

        Ok(())
    }
}

/// Run the command loop until cancelled.
///
/// When `allowed_chat` is set, messages from any other chat are ignored.
pub async fn run_bot(
    telegram: Arc<TelegramClient>,
    handler: Arc<CommandHandler>,
    allowed_chat: Option<i64>,
    cancel_token: CancellationToken,
) {
    tracing::info!(restricted = allowed_chat.is_some(), "Starting Telegram bot");

    // Without a username, `/cmd@name` suffixes cannot be checked and are ignored
    let username = match telegram.get_me().await {
        Ok(username) => username,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch bot username");
            None
        }
    };

    let mut offset = 0i64;

    loop {
        let updates = tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!("Telegram bot shutting down");
                break;
            }
            result = telegram.get_updates(offset) => result,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to poll Telegram updates");
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            let chat_id = message.chat.id;

            if username
                .as_deref()
                .is_some_and(|name| addressed_elsewhere(&text, name))
            {
                tracing::debug!(chat_id = chat_id, "Ignoring command addressed to another bot");
                continue;
            }

            if allowed_chat.is_some_and(|allowed| allowed != chat_id) {
                tracing::debug!(chat_id = chat_id, "Ignoring message from unauthorised chat");
                continue;
            }

            let telegram = telegram.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                let Some(reply) = handler.handle(&text).await else {
                    return;
                };
                if let Err(e) = telegram.send_message(chat_id, &reply).await {
                    tracing::error!(error = %e, chat_id = chat_id, "Failed to send reply");
                }
            });
        }
    }
}
