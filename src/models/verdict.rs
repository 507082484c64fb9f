//! Evaluation outcome

use super::TokenAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule group a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleGroup {
    /// Local denylist
    Listing,
    /// On-chain risk signals
    Risk,
    /// Market liquidity health
    Market,
    /// Contract hygiene
    Contract,
}

/// A single admission rule.
///
/// Declaration order is evaluation order, which is also the order rules
/// appear in a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    Blacklisted,
    RiskScore,
    NonMintable,
    NonFreezable,
    LiquidityLock,
    HolderDistribution,
    MinLiquidity,
    VolumeLiquidityRatio,
    BuyPressure,
    NotProxy,
    OwnershipBurned,
    ContractVerified,
}

impl Rule {
    /// Stable identifier used in replies, logs and metrics
    pub fn id(&self) -> &'static str {
        match self {
            Rule::Blacklisted => "blacklisted",
            Rule::RiskScore => "risk-score",
            Rule::NonMintable => "non-mintable",
            Rule::NonFreezable => "non-freezable",
            Rule::LiquidityLock => "liquidity-lock",
            Rule::HolderDistribution => "holder-distribution",
            Rule::MinLiquidity => "min-liquidity",
            Rule::VolumeLiquidityRatio => "volume-liquidity-ratio",
            Rule::BuyPressure => "buy-pressure",
            Rule::NotProxy => "not-proxy",
            Rule::OwnershipBurned => "ownership-burned",
            Rule::ContractVerified => "contract-verified",
        }
    }

    pub fn group(&self) -> RuleGroup {
        match self {
            Rule::Blacklisted => RuleGroup::Listing,
            Rule::RiskScore
            | Rule::NonMintable
            | Rule::NonFreezable
            | Rule::LiquidityLock
            | Rule::HolderDistribution => RuleGroup::Risk,
            Rule::MinLiquidity | Rule::VolumeLiquidityRatio | Rule::BuyPressure => {
                RuleGroup::Market
            }
            Rule::NotProxy | Rule::OwnershipBurned | Rule::ContractVerified => {
                RuleGroup::Contract
            }
        }
    }

    /// Source whose data the rule is judged on; None for the local blacklist
    pub fn source(&self) -> Option<DataSource> {
        match self.group() {
            RuleGroup::Listing => None,
            RuleGroup::Risk | RuleGroup::Contract => Some(DataSource::Risk),
            RuleGroup::Market => Some(DataSource::Market),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// External source an evaluation depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Risk,
    Market,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Risk => "risk",
            DataSource::Market => "market",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admission decision for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub address: TokenAddress,
    /// True iff `failed_rules` is empty
    pub admitted: bool,
    /// Failed rules in evaluation order
    pub failed_rules: Vec<Rule>,
    /// Sources whose fetch failed; their rules were judged on absent data
    pub unavailable: Vec<DataSource>,
}

impl Verdict {
    /// Build a verdict from the collected failures
    pub fn from_failures(
        address: TokenAddress,
        failed_rules: Vec<Rule>,
        unavailable: Vec<DataSource>,
    ) -> Self {
        Self {
            address,
            admitted: failed_rules.is_empty(),
            failed_rules,
            unavailable,
        }
    }

    /// Rejection by the local blacklist
    pub fn blacklisted(address: TokenAddress) -> Self {
        Self::from_failures(address, vec![Rule::Blacklisted], Vec::new())
    }

    pub fn is_blacklisted(&self) -> bool {
        self.failed_rules.contains(&Rule::Blacklisted)
    }

    /// Whether any source could not be reached or parsed
    pub fn has_data_gaps(&self) -> bool {
        !self.unavailable.is_empty()
    }

    pub fn failed(&self, rule: Rule) -> bool {
        self.failed_rules.contains(&rule)
    }

    /// Rule identifiers, in order
    pub fn reasons(&self) -> Vec<&'static str> {
        self.failed_rules.iter().map(Rule::id).collect()
    }

    /// Failed rules judged on data that actually arrived
    pub fn confirmed_failures(&self) -> Vec<Rule> {
        self.failed_rules
            .iter()
            .copied()
            .filter(|rule| {
                rule.source()
                    .map_or(true, |source| !self.unavailable.contains(&source))
            })
            .collect()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.admitted {
            write!(f, "{}: admitted", self.address)
        } else {
            write!(f, "{}: rejected [{}]", self.address, self.reasons().join(", "))
        }
    }
}
