//! Rugcheck risk-scoring client
//!
//! API: GET {base}/address/{address}/score

use super::{get_json, RiskSource};
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::models::{RiskReport, TokenAddress};
use std::time::Duration;

/// HTTP client for the risk-scoring service
pub struct RugcheckClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RugcheckClient {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }

    pub fn score_url(&self, address: &TokenAddress) -> String {
        format!("{}/address/{}/score", self.base_url, address)
    }

    /// Fetch and decode the risk report for an address
    pub async fn fetch(&self, address: &TokenAddress) -> Result<RiskReport, FetchError> {
        let url = self.score_url(address);
        tracing::debug!(address = %address, url = %url, "Fetching risk report");

        let body = get_json(&self.client, &url, self.timeout).await?;
        parse_risk_report(body)
    }
}

/// Decode a risk payload; anything but a JSON object with 0-100 scores is malformed
pub fn parse_risk_report(body: serde_json::Value) -> Result<RiskReport, FetchError> {
    if !body.is_object() {
        return Err(FetchError::Malformed(
            "risk payload is not a JSON object".to_string(),
        ));
    }

    let report: RiskReport =
        serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    report.check_ranges()?;
    Ok(report)
}

#[async_trait::async_trait]
impl RiskSource for RugcheckClient {
    async fn risk_report(&self, address: &TokenAddress) -> Result<RiskReport, FetchError> {
        self.fetch(address).await
    }
}
