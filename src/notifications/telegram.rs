//! Telegram notification service
//!
//! Pushes monitor alerts to the operator chat with rate limiting to prevent spam.

use super::{AlertLevel, NotificationEvent, NotificationService};
use crate::bot::TelegramClient;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limiter for notifications
struct RateLimiter {
    /// Last sent time for each message key
    last_sent: RwLock<HashMap<String, Instant>>,
    /// Minimum interval between messages
    interval: Duration,
}

impl RateLimiter {
    fn new(interval_seconds: u64) -> Self {
        Self {
            last_sent: RwLock::new(HashMap::new()),
            interval: Duration::from_secs(interval_seconds),
        }
    }

    /// Check if we can send a message with this key
    fn can_send(&self, key: &str) -> bool {
        let last_sent = self.last_sent.read();
        match last_sent.get(key) {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    fn mark_sent(&self, key: &str) {
        let mut last_sent = self.last_sent.write();
        last_sent.insert(key.to_string(), Instant::now());
    }
}

/// Telegram notification service
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
    /// Operator chat; no chat means nowhere to push
    chat_id: Option<i64>,
    enabled: bool,
    rate_limiter: RateLimiter,
}

impl TelegramNotifier {
    pub fn new(
        client: Arc<TelegramClient>,
        chat_id: Option<i64>,
        enabled: bool,
        rate_limit_seconds: u64,
    ) -> Self {
        Self {
            client,
            chat_id,
            enabled,
            rate_limiter: RateLimiter::new(rate_limit_seconds),
        }
    }

    /// Format message with level prefix
    fn format_with_level(level: AlertLevel, message: &str) -> String {
        let level_prefix = match level {
            AlertLevel::Critical => "🔴 CRITICAL",
            AlertLevel::Important => "🟡 IMPORTANT",
            AlertLevel::Info => "🔵 INFO",
        };

        format!("{}\n\n{}", level_prefix, message)
    }
}

#[async_trait::async_trait]
impl NotificationService for TelegramNotifier {
    async fn notify(&self, event: NotificationEvent) -> anyhow::Result<()> {
        let Some(chat_id) = self.chat_id.filter(|_| self.enabled) else {
            return Ok(());
        };

        // Critical alerts bypass the rate limit
        let rate_key = event.rate_limit_key();
        if event.level() != AlertLevel::Critical && !self.rate_limiter.can_send(&rate_key) {
            tracing::debug!(
                key = %rate_key,
                "Rate limited, skipping notification"
            );
            return Ok(());
        }

        let level = event.level();
        let formatted = Self::format_with_level(level, &event.format_message());

        self.client.send_message(chat_id, &formatted).await?;
        self.rate_limiter.mark_sent(&rate_key);

        tracing::info!(
            level = %level,
            "Sent Telegram notification"
        );

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled && self.chat_id.is_some()
    }
}
