//! External data sources
//!
//! Two independent HTTP services feed the evaluator:
//! - Rugcheck: on-chain risk metadata
//! - DexScreener: liquidity, volume and transaction counts
//!
//! Each client makes exactly one attempt per call, bounded by its own
//! timeout, and reports failures as `FetchError` values.

pub mod dexscreener;
pub mod rugcheck;

pub use dexscreener::DexScreenerClient;
pub use rugcheck::RugcheckClient;

use crate::error::{AppError, AppResult, FetchError};
use crate::models::{MarketReport, RiskReport, TokenAddress};
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Provider of risk reports
#[async_trait::async_trait]
pub trait RiskSource: Send + Sync {
    async fn risk_report(&self, address: &TokenAddress) -> Result<RiskReport, FetchError>;
}

/// Provider of market reports
#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {
    async fn market_report(&self, address: &TokenAddress) -> Result<MarketReport, FetchError>;
}

/// Build the shared HTTP client
pub fn build_http_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("pair_sentinel/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Http(format!("Failed to create HTTP client: {}", e)))
}

/// GET a JSON document with a per-request timeout
async fn get_json(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<serde_json::Value, FetchError> {
    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}
