//! Local denylist of tokens, developers and behavioural patterns
//!
//! Checked before any network call. Developer and pattern data for an
//! address come from pluggable lookups; the defaults know nothing and
//! return empty sets.

use crate::config::BlacklistConfig;
use crate::models::TokenAddress;
use std::collections::HashSet;
use std::sync::Arc;

/// Resolves the developer identities behind an address
pub trait DeveloperLookup: Send + Sync {
    fn developers(&self, address: &TokenAddress) -> HashSet<String>;
}

/// Detects behavioural pattern signatures for an address
pub trait PatternDetector: Send + Sync {
    fn patterns(&self, address: &TokenAddress) -> HashSet<String>;
}

/// Lookup used when no on-chain analysis service is wired in
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeveloperLookup;

impl DeveloperLookup for NoDeveloperLookup {
    fn developers(&self, _address: &TokenAddress) -> HashSet<String> {
        HashSet::new()
    }
}

/// Detector used when no on-chain analysis service is wired in
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPatternDetector;

impl PatternDetector for NoPatternDetector {
    fn patterns(&self, _address: &TokenAddress) -> HashSet<String> {
        HashSet::new()
    }
}

/// Which blacklist category matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistHit {
    Token,
    Developer(String),
    Pattern(String),
}

impl BlacklistHit {
    pub fn category(&self) -> &'static str {
        match self {
            BlacklistHit::Token => "token",
            BlacklistHit::Developer(_) => "developer",
            BlacklistHit::Pattern(_) => "pattern",
        }
    }
}

/// Read-only blacklist, immutable after construction
pub struct BlacklistStore {
    tokens: HashSet<String>,
    developers: HashSet<String>,
    patterns: HashSet<String>,
    developer_lookup: Arc<dyn DeveloperLookup>,
    pattern_detector: Arc<dyn PatternDetector>,
}

impl BlacklistStore {
    /// Build a store with the default (empty) lookups
    pub fn new(config: BlacklistConfig) -> Self {
        Self::with_lookups(
            config,
            Arc::new(NoDeveloperLookup),
            Arc::new(NoPatternDetector),
        )
    }

    pub fn with_lookups(
        config: BlacklistConfig,
        developer_lookup: Arc<dyn DeveloperLookup>,
        pattern_detector: Arc<dyn PatternDetector>,
    ) -> Self {
        Self {
            tokens: config.tokens.into_iter().collect(),
            developers: config.developers.into_iter().collect(),
            patterns: config.malicious_patterns.into_iter().collect(),
            developer_lookup,
            pattern_detector,
        }
    }

    /// First matching category, if any
    pub fn check(&self, address: &TokenAddress) -> Option<BlacklistHit> {
        if self.tokens.contains(address.as_str()) {
            return Some(BlacklistHit::Token);
        }

        if let Some(dev) = self
            .developer_lookup
            .developers(address)
            .into_iter()
            .find(|dev| self.developers.contains(dev))
        {
            return Some(BlacklistHit::Developer(dev));
        }

        self.pattern_detector
            .patterns(address)
            .into_iter()
            .find(|pattern| self.patterns.contains(pattern))
            .map(BlacklistHit::Pattern)
    }

    pub fn is_blacklisted(&self, address: &TokenAddress) -> bool {
        self.check(address).is_some()
    }

    /// (tokens, developers, patterns) entry counts
    pub fn entry_counts(&self) -> (usize, usize, usize) {
        (self.tokens.len(), self.developers.len(), self.patterns.len())
    }
}
