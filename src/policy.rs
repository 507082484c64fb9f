//! Admission policy thresholds
//!
//! `PolicyStore` hands out copies of the current `Policy` so an evaluation
//! always works against one consistent set of thresholds. Updates go through
//! `PolicyField::validate` and hold the write lock only for the assignment.

use crate::error::{AppError, AppResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Longest allowed monitor polling interval (seconds)
const MAX_POLLING_INTERVAL_SECS: f64 = 86_400.0;

/// Snapshot of every threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Risk score must be strictly below this
    pub max_risk_score: f64,
    /// Liquidity lock score must be strictly above this
    pub min_liquidity_lock: f64,
    /// Holder distribution score must be strictly above this
    pub min_distribution_score: f64,
    /// Pool liquidity (USD) must be strictly above this
    pub min_liquidity: f64,
    /// 24h volume / liquidity must be strictly below this
    pub max_volume_ratio: f64,
    /// Buys must exceed sells times this
    pub buy_sell_ratio: f64,
    /// Stop loss percentage, in (-100, 0)
    pub stop_loss: f64,
    /// Take profit percentage, in (0, 1000)
    pub take_profit: f64,
    /// Monitor cadence in seconds
    pub polling_interval: u64,
}

impl Policy {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> AppResult<()> {
        for field in PolicyField::ALL {
            field.validate(self.get(field))?;
        }
        Ok(())
    }

    /// Read a field as f64
    pub fn get(&self, field: PolicyField) -> f64 {
        match field {
            PolicyField::MaxRiskScore => self.max_risk_score,
            PolicyField::MinLiquidityLock => self.min_liquidity_lock,
            PolicyField::MinDistributionScore => self.min_distribution_score,
            PolicyField::MinLiquidity => self.min_liquidity,
            PolicyField::MaxVolumeRatio => self.max_volume_ratio,
            PolicyField::BuySellRatio => self.buy_sell_ratio,
            PolicyField::StopLoss => self.stop_loss,
            PolicyField::TakeProfit => self.take_profit,
            PolicyField::PollingInterval => self.polling_interval as f64,
        }
    }

    /// Write an already-validated value
    fn set(&mut self, field: PolicyField, value: f64) {
        match field {
            PolicyField::MaxRiskScore => self.max_risk_score = value,
            PolicyField::MinLiquidityLock => self.min_liquidity_lock = value,
            PolicyField::MinDistributionScore => self.min_distribution_score = value,
            PolicyField::MinLiquidity => self.min_liquidity = value,
            PolicyField::MaxVolumeRatio => self.max_volume_ratio = value,
            PolicyField::BuySellRatio => self.buy_sell_ratio = value,
            PolicyField::StopLoss => self.stop_loss = value,
            PolicyField::TakeProfit => self.take_profit = value,
            PolicyField::PollingInterval => self.polling_interval = value as u64,
        }
    }
}

/// Individually updatable threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyField {
    MaxRiskScore,
    MinLiquidityLock,
    MinDistributionScore,
    MinLiquidity,
    MaxVolumeRatio,
    BuySellRatio,
    StopLoss,
    TakeProfit,
    PollingInterval,
}

impl PolicyField {
    pub const ALL: [PolicyField; 9] = [
        PolicyField::MaxRiskScore,
        PolicyField::MinLiquidityLock,
        PolicyField::MinDistributionScore,
        PolicyField::MinLiquidity,
        PolicyField::MaxVolumeRatio,
        PolicyField::BuySellRatio,
        PolicyField::StopLoss,
        PolicyField::TakeProfit,
        PolicyField::PollingInterval,
    ];

    /// Configuration key (`section.name`)
    pub fn key(&self) -> &'static str {
        match self {
            PolicyField::MaxRiskScore => "security.max_risk_score",
            PolicyField::MinLiquidityLock => "security.min_liquidity_lock",
            PolicyField::MinDistributionScore => "security.min_distribution_score",
            PolicyField::MinLiquidity => "filters.min_liquidity",
            PolicyField::MaxVolumeRatio => "filters.max_volume_ratio",
            PolicyField::BuySellRatio => "filters.buy_sell_ratio",
            PolicyField::StopLoss => "trading.stop_loss",
            PolicyField::TakeProfit => "trading.take_profit",
            PolicyField::PollingInterval => "trading.polling_interval",
        }
    }

    /// Range check for a candidate value
    pub fn validate(&self, value: f64) -> AppResult<()> {
        if !value.is_finite() {
            return Err(AppError::Validation(format!(
                "{} must be a finite number",
                self.key()
            )));
        }

        let in_range = match self {
            PolicyField::MaxRiskScore
            | PolicyField::MinLiquidityLock
            | PolicyField::MinDistributionScore => (0.0..=100.0).contains(&value),
            PolicyField::MinLiquidity | PolicyField::BuySellRatio => value >= 0.0,
            PolicyField::MaxVolumeRatio => value > 0.0,
            PolicyField::StopLoss => value > -100.0 && value < 0.0,
            PolicyField::TakeProfit => value > 0.0 && value < 1000.0,
            PolicyField::PollingInterval => {
                value.fract() == 0.0 && (1.0..=MAX_POLLING_INTERVAL_SECS).contains(&value)
            }
        };

        if in_range {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "{} must be {}, got {}",
                self.key(),
                self.range_description(),
                value
            )))
        }
    }

    fn range_description(&self) -> &'static str {
        match self {
            PolicyField::MaxRiskScore
            | PolicyField::MinLiquidityLock
            | PolicyField::MinDistributionScore => "between 0 and 100",
            PolicyField::MinLiquidity | PolicyField::BuySellRatio => "zero or positive",
            PolicyField::MaxVolumeRatio => "positive",
            PolicyField::StopLoss => "between -100 and 0 (exclusive)",
            PolicyField::TakeProfit => "between 0 and 1000 (exclusive)",
            PolicyField::PollingInterval => "a whole number of seconds between 1 and 86400",
        }
    }
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PolicyField {
    type Err = AppError;

    /// Accepts either the bare name (`stop_loss`) or the full key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        PolicyField::ALL
            .into_iter()
            .find(|field| {
                let key = field.key();
                key == name || key.rsplit('.').next() == Some(name.as_str())
            })
            .ok_or_else(|| AppError::Validation(format!("Unknown policy field: {}", s)))
    }
}

/// Shared, concurrently readable policy
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Policy>,
}

impl PolicyStore {
    /// Create a store; the initial policy must already be valid
    pub fn new(initial: Policy) -> AppResult<Self> {
        initial.validate()?;
        Ok(Self {
            current: RwLock::new(initial),
        })
    }

    /// Consistent copy of the current thresholds
    pub fn snapshot(&self) -> Policy {
        *self.current.read()
    }

    /// Parse, validate and apply a single field update.
    ///
    /// On any error the policy is left untouched.
    pub fn update(&self, field: PolicyField, raw: &str) -> AppResult<Policy> {
        let value: f64 = raw.trim().parse().map_err(|_| {
            AppError::Validation(format!("{} must be a number, got '{}'", field.key(), raw.trim()))
        })?;
        field.validate(value)?;

        let updated = {
            let mut current = self.current.write();
            current.set(field, value);
            *current
        };

        tracing::info!(field = %field, value = value, "Policy updated");
        Ok(updated)
    }

    pub fn set_stop_loss(&self, raw: &str) -> AppResult<f64> {
        self.update(PolicyField::StopLoss, raw)
            .map(|policy| policy.stop_loss)
    }

    pub fn set_take_profit(&self, raw: &str) -> AppResult<f64> {
        self.update(PolicyField::TakeProfit, raw)
            .map(|policy| policy.take_profit)
    }
}
