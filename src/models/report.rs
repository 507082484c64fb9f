//! Reports produced by the external data sources

use crate::constants::fail_closed;
use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// Risk metadata from the risk-scoring service.
///
/// Every field is optional; a missing field is read through the accessor
/// below, which substitutes the least-trusting value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// 0-100, higher is riskier
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub is_mintable: Option<bool>,
    #[serde(default)]
    pub is_freezable: Option<bool>,
    /// 0-100
    #[serde(default)]
    pub liquidity_lock_score: Option<f64>,
    /// 0-100
    #[serde(default)]
    pub holders_distribution_score: Option<f64>,
    #[serde(default)]
    pub is_proxy: Option<bool>,
    #[serde(default)]
    pub owner_burn: Option<bool>,
    #[serde(default)]
    pub verified: Option<bool>,
}

impl RiskReport {
    /// Report with no fields at all (fetch failed)
    pub fn absent() -> Self {
        Self::default()
    }

    /// Reject scores outside 0-100; a NaN score is out of range too
    pub fn check_ranges(&self) -> Result<(), FetchError> {
        let scores = [
            ("riskScore", self.risk_score),
            ("liquidityLockScore", self.liquidity_lock_score),
            ("holdersDistributionScore", self.holders_distribution_score),
        ];
        for (name, score) in scores {
            if let Some(value) = score {
                if !(0.0..=100.0).contains(&value) {
                    return Err(FetchError::Malformed(format!(
                        "{} out of range: {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score.unwrap_or(fail_closed::RISK_SCORE)
    }

    pub fn is_mintable(&self) -> bool {
        self.is_mintable.unwrap_or(fail_closed::IS_MINTABLE)
    }

    pub fn is_freezable(&self) -> bool {
        self.is_freezable.unwrap_or(fail_closed::IS_FREEZABLE)
    }

    pub fn liquidity_lock_score(&self) -> f64 {
        self.liquidity_lock_score
            .unwrap_or(fail_closed::LIQUIDITY_LOCK_SCORE)
    }

    pub fn holders_distribution_score(&self) -> f64 {
        self.holders_distribution_score
            .unwrap_or(fail_closed::HOLDERS_DISTRIBUTION_SCORE)
    }

    /// Only an explicit `false` counts as "not a proxy"
    pub fn is_known_non_proxy(&self) -> bool {
        self.is_proxy == Some(false)
    }

    pub fn owner_burn(&self) -> bool {
        self.owner_burn.unwrap_or(fail_closed::OWNER_BURN)
    }

    pub fn verified(&self) -> bool {
        self.verified.unwrap_or(fail_closed::VERIFIED)
    }
}

/// Market metadata from the market-data service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub buys_24h: u64,
    pub sells_24h: u64,
}

impl MarketReport {
    pub fn new(liquidity_usd: f64, volume_24h_usd: f64, buys_24h: u64, sells_24h: u64) -> Self {
        Self {
            liquidity_usd,
            volume_24h_usd,
            buys_24h,
            sells_24h,
        }
    }

    /// 24h volume divided by liquidity, 0 when there is no liquidity
    pub fn volume_liquidity_ratio(&self) -> f64 {
        if self.liquidity_usd > 0.0 {
            self.volume_24h_usd / self.liquidity_usd
        } else {
            0.0
        }
    }
}
