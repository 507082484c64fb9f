//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::blacklist::BlacklistStore;
use crate::policy::{Policy, PolicyStore};
use crate::watchlist::Watchlist;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// Watchlist status
    pub watchlist: WatchlistHealth,
    /// Blacklist entry counts
    pub blacklist: BlacklistHealth,
    /// Thresholds currently in force
    pub policy: Policy,
}

/// Health status enum
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some watched addresses could not be verified on their last check
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct WatchlistHealth {
    pub size: usize,
    /// Entries whose last verdict had a source outage
    pub unverifiable: usize,
}

#[derive(Debug, Serialize)]
pub struct BlacklistHealth {
    pub tokens: usize,
    pub developers: usize,
    pub malicious_patterns: usize,
}

/// Shared application state for health checks
pub struct AppState {
    /// Application start time
    pub started_at: chrono::DateTime<Utc>,
    pub watchlist: Arc<Watchlist>,
    pub policy: Arc<PolicyStore>,
    pub blacklist: Arc<BlacklistStore>,
}

/// Health check handler
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = (Utc::now() - state.started_at).num_seconds();

    let addresses = state.watchlist.addresses();
    let unverifiable = addresses
        .iter()
        .filter_map(|address| state.watchlist.get(address))
        .filter(|entry| entry.last_verdict.has_data_gaps())
        .count();

    let status = if unverifiable > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let (tokens, developers, malicious_patterns) = state.blacklist.entry_counts();

    let response = HealthResponse {
        status,
        uptime_seconds: uptime,
        watchlist: WatchlistHealth {
            size: addresses.len(),
            unverifiable,
        },
        blacklist: BlacklistHealth {
            tokens,
            developers,
            malicious_patterns,
        },
        policy: state.policy.snapshot(),
    };

    // Degraded still answers 200
    (StatusCode::OK, Json(response))
}
