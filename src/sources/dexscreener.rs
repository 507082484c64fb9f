//! DexScreener market-data client
//!
//! API: GET {base}/pairs/{chain}/{pairAddress}
//!
//! The pair object is read from `pair`, else the first entry of `pairs`,
//! else the top-level document. Missing numeric fields count as zero.

use super::{get_json, MarketSource};
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::models::{MarketReport, TokenAddress};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// A trading pair from DexScreener (only the fields we use)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexPair {
    #[serde(default)]
    pub liquidity: Option<DexLiquidity>,
    #[serde(default)]
    pub volume: Option<DexVolume>,
    #[serde(default)]
    pub txns: Option<DexTxns>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexVolume {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexTxns {
    pub h24: Option<DexTxnCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexTxnCount {
    pub buys: Option<u64>,
    pub sells: Option<u64>,
}

impl DexPair {
    /// Convert into a report, rejecting negative amounts
    pub fn into_report(self) -> Result<MarketReport, FetchError> {
        let liquidity_usd = self.liquidity.and_then(|l| l.usd).unwrap_or(0.0);
        let volume_24h_usd = self.volume.and_then(|v| v.h24).unwrap_or(0.0);
        let (buys_24h, sells_24h) = self
            .txns
            .and_then(|t| t.h24)
            .map(|c| (c.buys.unwrap_or(0), c.sells.unwrap_or(0)))
            .unwrap_or((0, 0));

        if liquidity_usd < 0.0 || volume_24h_usd < 0.0 {
            return Err(FetchError::Malformed(format!(
                "negative market amounts (liquidity {}, volume {})",
                liquidity_usd, volume_24h_usd
            )));
        }

        Ok(MarketReport::new(
            liquidity_usd,
            volume_24h_usd,
            buys_24h,
            sells_24h,
        ))
    }
}

/// HTTP client for the market-data service
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
    chain: String,
    timeout: Duration,
}

impl DexScreenerClient {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain: config.chain.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn pair_url(&self, address: &TokenAddress) -> String {
        format!("{}/pairs/{}/{}", self.base_url, self.chain, address)
    }

    /// Fetch and decode the market report for a pair
    pub async fn fetch(&self, address: &TokenAddress) -> Result<MarketReport, FetchError> {
        let url = self.pair_url(address);
        tracing::debug!(address = %address, url = %url, "Fetching market report");

        let body = get_json(&self.client, &url, self.timeout).await?;
        parse_market_report(body)
    }
}

/// Locate the pair object in a response and decode it
pub fn parse_market_report(body: Value) -> Result<MarketReport, FetchError> {
    let Value::Object(mut doc) = body else {
        return Err(FetchError::Malformed(
            "market payload is not a JSON object".to_string(),
        ));
    };

    let pair = match (doc.remove("pair"), doc.remove("pairs")) {
        (Some(pair @ Value::Object(_)), _) => pair,
        (_, Some(Value::Array(pairs))) => pairs.into_iter().next().ok_or(FetchError::NotFound)?,
        (Some(Value::Null), _) | (_, Some(Value::Null)) => return Err(FetchError::NotFound),
        (Some(_), _) | (_, Some(_)) => {
            return Err(FetchError::Malformed("unexpected pair envelope".to_string()))
        }
        (None, None) => Value::Object(doc),
    };

    if !pair.is_object() {
        return Err(FetchError::Malformed("pair entry is not a JSON object".to_string()));
    }

    serde_json::from_value::<DexPair>(pair)
        .map_err(|e| FetchError::Malformed(e.to_string()))?
        .into_report()
}

#[async_trait::async_trait]
impl MarketSource for DexScreenerClient {
    async fn market_report(&self, address: &TokenAddress) -> Result<MarketReport, FetchError> {
        self.fetch(address).await
    }
}
