//! Admission rules
//!
//! Three independent groups, each returning the rules it failed in table
//! order. Every comparison is strict, so a value sitting exactly on its
//! threshold fails.

use crate::models::{MarketReport, RiskReport, Rule};
use crate::policy::Policy;

/// Group A: on-chain risk signals
pub fn check_risk(report: &RiskReport, policy: &Policy) -> Vec<Rule> {
    let checks = [
        (Rule::RiskScore, report.risk_score() < policy.max_risk_score),
        (Rule::NonMintable, !report.is_mintable()),
        (Rule::NonFreezable, !report.is_freezable()),
        (
            Rule::LiquidityLock,
            report.liquidity_lock_score() > policy.min_liquidity_lock,
        ),
        (
            Rule::HolderDistribution,
            report.holders_distribution_score() > policy.min_distribution_score,
        ),
    ];
    failures(checks)
}

/// Group B: market health. An absent report fails every rule.
pub fn check_market(report: Option<&MarketReport>, policy: &Policy) -> Vec<Rule> {
    let Some(report) = report else {
        return vec![
            Rule::MinLiquidity,
            Rule::VolumeLiquidityRatio,
            Rule::BuyPressure,
        ];
    };

    let checks = [
        (Rule::MinLiquidity, report.liquidity_usd > policy.min_liquidity),
        (
            Rule::VolumeLiquidityRatio,
            report.volume_liquidity_ratio() < policy.max_volume_ratio,
        ),
        (
            Rule::BuyPressure,
            report.buys_24h as f64 > report.sells_24h as f64 * policy.buy_sell_ratio,
        ),
    ];
    failures(checks)
}

/// Group C: contract hygiene
pub fn check_contract(report: &RiskReport) -> Vec<Rule> {
    let checks = [
        (Rule::NotProxy, report.is_known_non_proxy()),
        (Rule::OwnershipBurned, report.owner_burn()),
        (Rule::ContractVerified, report.verified()),
    ];
    failures(checks)
}

fn failures<const N: usize>(checks: [(Rule, bool); N]) -> Vec<Rule> {
    checks
        .into_iter()
        .filter_map(|(rule, passed)| (!passed).then_some(rule))
        .collect()
}
