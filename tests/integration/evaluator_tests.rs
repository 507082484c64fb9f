//! Safety evaluator tests
//!
//! Runs the full pipeline against call-counting mock sources:
//! blacklist short-circuit, fail-closed defaults, threshold boundaries
//! and source outages.

use crate::common::{addr, clean_risk, fixture, healthy_market};
use pair_sentinel::{DataSource, FetchError, MarketReport, PolicyField, RiskReport, Rule};
use std::time::{Duration, Instant};

/// Blacklisted address is rejected without touching either source
#[tokio::test]
async fn test_blacklisted_address_short_circuits() {
    let fx = fixture(&["BadToken"]);

    let verdict = fx.evaluator.evaluate(&addr("BadToken")).await;

    assert!(!verdict.admitted);
    assert_eq!(verdict.reasons(), vec!["blacklisted"]);
    assert_eq!(fx.risk.calls(), 0);
    assert_eq!(fx.market.calls(), 0);
    assert_eq!(
        fx.metrics
            .evaluations
            .with_label_values(&["blacklisted"])
            .get(),
        1
    );
}

/// Clean risk and healthy market data is admitted
#[tokio::test]
async fn test_clean_token_admitted() {
    let fx = fixture(&[]);

    let verdict = fx.evaluator.evaluate(&addr("GoodToken")).await;

    assert!(verdict.admitted);
    assert!(verdict.failed_rules.is_empty());
    assert!(verdict.unavailable.is_empty());
    assert_eq!(fx.risk.calls(), 1);
    assert_eq!(fx.market.calls(), 1);
    assert!(fx.evaluator.is_safe(&addr("GoodToken")).await);
}

/// A mintable token fails only the mintable rule
#[tokio::test]
async fn test_mintable_token_rejected() {
    let fx = fixture(&[]);
    fx.risk.set(Ok(RiskReport {
        is_mintable: Some(true),
        ..clean_risk()
    }));

    let verdict = fx.evaluator.evaluate(&addr("MintToken")).await;

    assert!(!verdict.admitted);
    assert_eq!(verdict.reasons(), vec!["non-mintable"]);
}

/// A timed-out market fetch fails every market rule
#[tokio::test]
async fn test_market_timeout_fails_closed() {
    let fx = fixture(&[]);
    fx.market.set(Err(FetchError::Timeout));

    let verdict = fx.evaluator.evaluate(&addr("SlowToken")).await;

    assert!(!verdict.admitted);
    assert_eq!(
        verdict.failed_rules,
        vec![
            Rule::MinLiquidity,
            Rule::VolumeLiquidityRatio,
            Rule::BuyPressure
        ]
    );
    assert_eq!(verdict.unavailable, vec![DataSource::Market]);
    assert_eq!(
        fx.metrics
            .fetch_failures
            .with_label_values(&["market", "timeout"])
            .get(),
        1
    );
}

/// Both sources down: every non-blacklist rule fails, in table order
#[tokio::test]
async fn test_both_sources_down() {
    let fx = fixture(&[]);
    fx.risk.set(Err(FetchError::Status(500)));
    fx.market.set(Err(FetchError::Transport("connection refused".to_string())));

    let verdict = fx.evaluator.evaluate(&addr("DarkToken")).await;

    assert_eq!(
        verdict.reasons(),
        vec![
            "risk-score",
            "non-mintable",
            "non-freezable",
            "liquidity-lock",
            "holder-distribution",
            "min-liquidity",
            "volume-liquidity-ratio",
            "buy-pressure",
            "not-proxy",
            "ownership-burned",
            "contract-verified",
        ]
    );
    assert_eq!(verdict.unavailable, vec![DataSource::Risk, DataSource::Market]);
}

/// Values sitting exactly on a threshold are rejected
#[tokio::test]
async fn test_threshold_equality_rejects() {
    let fx = fixture(&[]);
    fx.risk.set(Ok(RiskReport {
        risk_score: Some(50.0),
        liquidity_lock_score: Some(50.0),
        holders_distribution_score: Some(50.0),
        ..clean_risk()
    }));
    // ratio == 1.0, buys == sells * 1.0
    fx.market.set(Ok(MarketReport::new(10_000.0, 10_000.0, 80, 80)));

    let verdict = fx.evaluator.evaluate(&addr("EdgeToken")).await;

    assert_eq!(
        verdict.failed_rules,
        vec![
            Rule::RiskScore,
            Rule::LiquidityLock,
            Rule::HolderDistribution,
            Rule::MinLiquidity,
            Rule::VolumeLiquidityRatio,
            Rule::BuyPressure,
        ]
    );
    assert!(verdict.unavailable.is_empty());
}

/// Missing risk fields behave like their fail-closed defaults
#[tokio::test]
async fn test_missing_fields_never_pass() {
    let fx = fixture(&[]);
    fx.risk.set(Ok(RiskReport::default()));

    let verdict = fx.evaluator.evaluate(&addr("BareToken")).await;

    assert!(!verdict.admitted);
    assert!(verdict.unavailable.is_empty());
    for rule in [
        Rule::RiskScore,
        Rule::NonMintable,
        Rule::NonFreezable,
        Rule::LiquidityLock,
        Rule::HolderDistribution,
        Rule::NotProxy,
        Rule::OwnershipBurned,
        Rule::ContractVerified,
    ] {
        assert!(verdict.failed(rule), "{} should fail", rule);
    }
    assert!(!verdict.failed(Rule::MinLiquidity));
}

/// Only an explicit false clears the proxy rule
#[tokio::test]
async fn test_proxy_must_be_explicitly_false() {
    let fx = fixture(&[]);
    fx.risk.set(Ok(RiskReport {
        is_proxy: None,
        ..clean_risk()
    }));

    let verdict = fx.evaluator.evaluate(&addr("ProxyToken")).await;
    assert_eq!(verdict.failed_rules, vec![Rule::NotProxy]);
}

/// Zero liquidity does not divide by zero; the ratio rule passes
#[tokio::test]
async fn test_zero_liquidity_ratio() {
    let fx = fixture(&[]);
    fx.market.set(Ok(MarketReport::new(0.0, 5_000.0, 10, 1)));

    let verdict = fx.evaluator.evaluate(&addr("EmptyPool")).await;

    assert_eq!(verdict.failed_rules, vec![Rule::MinLiquidity]);
}

/// Same responses and policy give the same verdict
#[tokio::test]
async fn test_evaluation_is_idempotent() {
    let fx = fixture(&[]);
    fx.market.set(Ok(MarketReport::new(20_000.0, 40_000.0, 5, 10)));

    let first = fx.evaluator.evaluate(&addr("SameToken")).await;
    let second = fx.evaluator.evaluate(&addr("SameToken")).await;

    assert_eq!(first, second);
    assert!(!first.admitted);
}

/// Policy updates apply to the next evaluation
#[tokio::test]
async fn test_policy_update_applies_to_next_evaluation() {
    let fx = fixture(&[]);
    let address = addr("TunedToken");
    assert!(fx.evaluator.evaluate(&address).await.admitted);

    fx.policy
        .update("min_liquidity".parse().unwrap(), "60000")
        .unwrap();

    let verdict = fx.evaluator.evaluate(&address).await;
    assert_eq!(verdict.failed_rules, vec![Rule::MinLiquidity]);
    assert_eq!(healthy_market().liquidity_usd, 50_000.0);
}

/// Scores outside 0-100 count as a risk outage, not as a clean report
#[tokio::test]
async fn test_out_of_range_risk_score_is_malformed() {
    let fx = fixture(&[]);

    for score in [-1000.0, -1.0, 101.0] {
        fx.risk.set(Ok(RiskReport {
            risk_score: Some(score),
            ..clean_risk()
        }));

        let verdict = fx.evaluator.evaluate(&addr("OddToken")).await;

        assert!(!verdict.admitted, "risk score {} was admitted", score);
        assert_eq!(verdict.unavailable, vec![DataSource::Risk]);
        assert!(verdict.failed(Rule::RiskScore));
    }
    assert_eq!(
        fx.metrics
            .fetch_failures
            .with_label_values(&["risk", "malformed"])
            .get(),
        3
    );

    fx.risk.set(Ok(RiskReport {
        risk_score: Some(0.0),
        ..clean_risk()
    }));
    assert!(fx.evaluator.evaluate(&addr("OddToken")).await.admitted);
}

/// Fetches run concurrently and a mid-flight policy update does not
/// change the verdict already being computed
#[tokio::test]
async fn test_policy_snapshot_survives_mid_flight_update() {
    let fx = fixture(&[]);
    fx.risk.set_delay(Some(Duration::from_millis(300)));
    fx.market.set_delay(Some(Duration::from_millis(300)));
    let address = addr("SlowToken");

    let started = Instant::now();
    let task = tokio::spawn({
        let evaluator = fx.evaluator.clone();
        let address = address.clone();
        async move { evaluator.evaluate(&address).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Risk score is 10, so this threshold would reject it
    fx.policy.update(PolicyField::MaxRiskScore, "5").unwrap();

    let verdict = task.await.unwrap();
    let elapsed = started.elapsed();

    assert!(verdict.admitted, "{:?}", verdict.reasons());
    assert!(elapsed < Duration::from_millis(550), "took {:?}", elapsed);

    fx.risk.set_delay(None);
    fx.market.set_delay(None);
    let verdict = fx.evaluator.evaluate(&address).await;
    assert_eq!(verdict.failed_rules, vec![Rule::RiskScore]);
}
