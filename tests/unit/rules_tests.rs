//! Rule group unit tests
//!
//! Covers each rule's pass/fail edge against the documented thresholds:
//! - risk group: strict comparisons and fail-closed defaults
//! - market group: ratio guard, buy pressure with zero sells
//! - contract group: proxy flag must be an explicit false

use pair_sentinel::evaluator::rules::{check_contract, check_market, check_risk};
use pair_sentinel::{MarketReport, Policy, RiskReport, Rule};

fn policy() -> Policy {
    Policy {
        max_risk_score: 50.0,
        min_liquidity_lock: 50.0,
        min_distribution_score: 50.0,
        min_liquidity: 10_000.0,
        max_volume_ratio: 1.0,
        buy_sell_ratio: 1.0,
        stop_loss: -10.0,
        take_profit: 50.0,
        polling_interval: 60,
    }
}

fn risk(score: f64, lock: f64, distribution: f64) -> RiskReport {
    RiskReport {
        risk_score: Some(score),
        is_mintable: Some(false),
        is_freezable: Some(false),
        liquidity_lock_score: Some(lock),
        holders_distribution_score: Some(distribution),
        is_proxy: Some(false),
        owner_burn: Some(true),
        verified: Some(true),
    }
}

#[test]
fn test_risk_score_just_below_threshold_passes() {
    assert!(check_risk(&risk(49.99, 80.0, 80.0), &policy()).is_empty());
    assert_eq!(
        check_risk(&risk(50.0, 80.0, 80.0), &policy()),
        vec![Rule::RiskScore]
    );
}

#[test]
fn test_scores_must_exceed_minimums() {
    assert_eq!(
        check_risk(&risk(10.0, 50.0, 50.01), &policy()),
        vec![Rule::LiquidityLock]
    );
    assert_eq!(
        check_risk(&risk(10.0, 50.01, 50.0), &policy()),
        vec![Rule::HolderDistribution]
    );
}

#[test]
fn test_missing_risk_score_uses_worst_value() {
    let report = RiskReport {
        risk_score: None,
        ..risk(10.0, 80.0, 80.0)
    };
    // Even the most permissive threshold cannot admit a missing score
    let permissive = Policy {
        max_risk_score: 100.0,
        ..policy()
    };
    assert_eq!(check_risk(&report, &permissive), vec![Rule::RiskScore]);
}

#[test]
fn test_missing_flags_are_untrusted() {
    let report = RiskReport {
        is_mintable: None,
        is_freezable: None,
        ..risk(10.0, 80.0, 80.0)
    };
    assert_eq!(
        check_risk(&report, &policy()),
        vec![Rule::NonMintable, Rule::NonFreezable]
    );
}

#[test]
fn test_market_thresholds() {
    let p = policy();
    assert!(check_market(Some(&MarketReport::new(10_000.01, 100.0, 2, 1)), &p).is_empty());
    assert_eq!(
        check_market(Some(&MarketReport::new(20_000.0, 20_000.0, 2, 1)), &p),
        vec![Rule::VolumeLiquidityRatio]
    );
}

#[test]
fn test_buy_pressure_uses_ratio() {
    let p = Policy {
        buy_sell_ratio: 1.5,
        ..policy()
    };
    // 150 buys against 100 sells is exactly 1.5x
    assert_eq!(
        check_market(Some(&MarketReport::new(50_000.0, 100.0, 150, 100)), &p),
        vec![Rule::BuyPressure]
    );
    assert!(check_market(Some(&MarketReport::new(50_000.0, 100.0, 151, 100)), &p).is_empty());
}

#[test]
fn test_zero_ratio_policy_with_no_trades() {
    let p = Policy {
        buy_sell_ratio: 0.0,
        ..policy()
    };
    // 0 > 0 is false
    assert_eq!(
        check_market(Some(&MarketReport::new(50_000.0, 100.0, 0, 0)), &p),
        vec![Rule::BuyPressure]
    );
}

#[test]
fn test_contract_rules() {
    let report = RiskReport {
        owner_burn: Some(false),
        verified: None,
        ..risk(10.0, 80.0, 80.0)
    };
    assert_eq!(
        check_contract(&report),
        vec![Rule::OwnershipBurned, Rule::ContractVerified]
    );
}
