//! Notification service for Pair Sentinel
//!
//! Provides push notifications via Telegram for monitor events:
//! - Watched token no longer passes the safety checks
//! - Watched token could not be verified (source outage)
//! - Monitor cycle crashed

pub mod telegram;

pub use telegram::TelegramNotifier;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Alert level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Critical alerts (monitor crash)
    Critical,
    /// Important alerts (watched token now failing)
    Important,
    /// Informational alerts (source outage during re-check)
    Info,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Critical => write!(f, "CRITICAL"),
            AlertLevel::Important => write!(f, "IMPORTANT"),
            AlertLevel::Info => write!(f, "INFO"),
        }
    }
}

/// Notification event types
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A watched address was admitted before and is now rejected
    WatchedTokenFailed { address: String, reasons: Vec<String> },
    /// A watched address could not be re-checked
    WatchedTokenUnverifiable { address: String, sources: Vec<String> },
    /// A monitor cycle ended abnormally
    MonitorCycleFailed { error: String },
}

impl NotificationEvent {
    /// Get the alert level for this event
    pub fn level(&self) -> AlertLevel {
        match self {
            NotificationEvent::WatchedTokenFailed { .. } => AlertLevel::Important,
            NotificationEvent::WatchedTokenUnverifiable { .. } => AlertLevel::Info,
            NotificationEvent::MonitorCycleFailed { .. } => AlertLevel::Critical,
        }
    }

    /// Key used to rate-limit repeats of the same alert
    pub fn rate_limit_key(&self) -> String {
        match self {
            NotificationEvent::WatchedTokenFailed { address, .. } => format!("failed:{}", address),
            NotificationEvent::WatchedTokenUnverifiable { address, .. } => {
                format!("unverifiable:{}", address)
            }
            NotificationEvent::MonitorCycleFailed { .. } => "monitor_cycle".to_string(),
        }
    }

    /// Format the event as a notification message
    pub fn format_message(&self) -> String {
        match self {
            NotificationEvent::WatchedTokenFailed { address, reasons } => {
                format!(
                    "🚨 {} no longer passes security checks: {}",
                    address,
                    reasons.join(", ")
                )
            }
            NotificationEvent::WatchedTokenUnverifiable { address, sources } => {
                format!(
                    "⚠️ Could not re-check {}: {} data unavailable",
                    address,
                    sources.join(" and ")
                )
            }
            NotificationEvent::MonitorCycleFailed { error } => {
                format!("🚨 Watchlist monitor error: {}", error)
            }
        }
    }
}

/// Notification service trait
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Send a notification
    async fn notify(&self, event: NotificationEvent) -> anyhow::Result<()>;

    /// Check if the service is enabled
    fn is_enabled(&self) -> bool;
}

/// Composite notifier that can send to multiple services
pub struct CompositeNotifier {
    services: Vec<Arc<dyn NotificationService>>,
}

impl CompositeNotifier {
    /// Create a new composite notifier
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Add a notification service
    pub fn add_service(&mut self, service: Arc<dyn NotificationService>) {
        self.services.push(service);
    }

    /// Send notification to all enabled services
    pub async fn notify(&self, event: NotificationEvent) {
        for service in &self.services {
            if service.is_enabled() {
                if let Err(e) = service.notify(event.clone()).await {
                    tracing::error!(
                        error = %e,
                        event = ?event.level(),
                        "Failed to send notification"
                    );
                }
            }
        }
    }
}

impl Default for CompositeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
