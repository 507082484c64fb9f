//! Safety evaluation pipeline
//!
//! 1. Local blacklist (no network on a hit)
//! 2. Risk and market fetches, concurrently
//! 3. Risk, market and contract rule groups against one policy snapshot
//!
//! Fetch failures never escape: the source is recorded as unavailable and
//! its rules are judged on absent data, which always fails them.

pub mod rules;

use crate::blacklist::BlacklistStore;
use crate::error::FetchError;
use crate::metrics::MetricsState;
use crate::models::{DataSource, MarketReport, RiskReport, TokenAddress, Verdict};
use crate::policy::PolicyStore;
use crate::sources::{MarketSource, RiskSource};
use std::sync::Arc;
use std::time::Instant;

/// Decides whether an address may be added to the watchlist
pub struct SafetyEvaluator {
    blacklist: Arc<BlacklistStore>,
    risk_source: Arc<dyn RiskSource>,
    market_source: Arc<dyn MarketSource>,
    policy: Arc<PolicyStore>,
    metrics: Arc<MetricsState>,
}

impl SafetyEvaluator {
    pub fn new(
        blacklist: Arc<BlacklistStore>,
        risk_source: Arc<dyn RiskSource>,
        market_source: Arc<dyn MarketSource>,
        policy: Arc<PolicyStore>,
        metrics: Arc<MetricsState>,
    ) -> Self {
        Self {
            blacklist,
            risk_source,
            market_source,
            policy,
            metrics,
        }
    }

    /// Evaluate an address.
    ///
    /// Dropping the returned future cancels both in-flight fetches.
    pub async fn evaluate(&self, address: &TokenAddress) -> Verdict {
        if let Some(hit) = self.blacklist.check(address) {
            tracing::info!(
                address = %address,
                category = hit.category(),
                "Address rejected by blacklist"
            );
            let verdict = Verdict::blacklisted(address.clone());
            self.metrics.record_verdict(&verdict);
            return verdict;
        }

        let policy = self.policy.snapshot();

        let (risk, market) = tokio::join!(
            self.fetch_risk(address),
            self.fetch_market(address)
        );

        let mut unavailable = Vec::new();
        let risk = risk.unwrap_or_else(|| {
            unavailable.push(DataSource::Risk);
            RiskReport::absent()
        });
        if market.is_none() {
            unavailable.push(DataSource::Market);
        }

        let mut failed = rules::check_risk(&risk, &policy);
        failed.extend(rules::check_market(market.as_ref(), &policy));
        failed.extend(rules::check_contract(&risk));

        let verdict = Verdict::from_failures(address.clone(), failed, unavailable);
        self.metrics.record_verdict(&verdict);

        if verdict.admitted {
            tracing::info!(address = %address, "Address passed all safety checks");
        } else {
            tracing::info!(
                address = %address,
                failed_rules = ?verdict.reasons(),
                unavailable = ?verdict.unavailable,
                "Address failed safety checks"
            );
        }

        verdict
    }

    /// Convenience wrapper returning only the admission flag
    pub async fn is_safe(&self, address: &TokenAddress) -> bool {
        self.evaluate(address).await.admitted
    }

    async fn fetch_risk(&self, address: &TokenAddress) -> Option<RiskReport> {
        let started = Instant::now();
        // Scores out of range are malformed whichever source produced them
        let result = self
            .risk_source
            .risk_report(address)
            .await
            .and_then(|report| report.check_ranges().map(|()| report));
        self.observe(DataSource::Risk, address, started, result.as_ref().err());
        result.ok()
    }

    async fn fetch_market(&self, address: &TokenAddress) -> Option<MarketReport> {
        let started = Instant::now();
        let result = self.market_source.market_report(address).await;
        self.observe(DataSource::Market, address, started, result.as_ref().err());
        result.ok()
    }

    fn observe(
        &self,
        source: DataSource,
        address: &TokenAddress,
        started: Instant,
        error: Option<&FetchError>,
    ) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if let Some(e) = error {
            tracing::warn!(
                address = %address,
                source = %source,
                error = %e,
                elapsed_ms = elapsed_ms,
                "Source fetch failed, treating data as absent"
            );
        }
        self.metrics
            .record_fetch(source, elapsed_ms, error.map(FetchError::kind));
    }
}
