//! In-memory watchlist and position book
//!
//! Nothing here is persisted; both are rebuilt empty on restart.

use crate::models::{TokenAddress, Verdict};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;

/// A watched address and its latest evaluation
#[derive(Debug, Clone, Serialize)]
pub struct WatchEntry {
    pub address: TokenAddress,
    pub added_at: DateTime<Utc>,
    pub last_checked_at: DateTime<Utc>,
    pub last_verdict: Verdict,
}

/// Addresses that passed admission
#[derive(Debug, Default)]
pub struct Watchlist {
    entries: RwLock<BTreeMap<TokenAddress, WatchEntry>>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address with the verdict that admitted it.
    ///
    /// Returns false if the address was already present.
    pub fn insert(&self, verdict: Verdict) -> bool {
        let now = Utc::now();
        let mut entries = self.entries.write();
        if entries.contains_key(&verdict.address) {
            return false;
        }
        entries.insert(
            verdict.address.clone(),
            WatchEntry {
                address: verdict.address.clone(),
                added_at: now,
                last_checked_at: now,
                last_verdict: verdict,
            },
        );
        true
    }

    pub fn remove(&self, address: &TokenAddress) -> bool {
        self.entries.write().remove(address).is_some()
    }

    pub fn contains(&self, address: &TokenAddress) -> bool {
        self.entries.read().contains_key(address)
    }

    /// Store a re-evaluation result and return the previous verdict.
    ///
    /// Returns None if the address was unwatched in the meantime.
    pub fn record_verdict(&self, verdict: Verdict) -> Option<Verdict> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&verdict.address)?;
        entry.last_checked_at = Utc::now();
        Some(std::mem::replace(&mut entry.last_verdict, verdict))
    }

    pub fn addresses(&self) -> Vec<TokenAddress> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn get(&self, address: &TokenAddress) -> Option<WatchEntry> {
        self.entries.read().get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// An open position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub token: TokenAddress,
    pub amount: f64,
    pub entry_price: f64,
}

/// Open positions keyed by token; populated by the execution side
#[derive(Debug, Default)]
pub struct PositionBook {
    positions: RwLock<BTreeMap<TokenAddress, Position>>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, position: Position) {
        self.positions
            .write()
            .insert(position.token.clone(), position);
    }

    pub fn close(&self, token: &TokenAddress) -> Option<Position> {
        self.positions.write().remove(token)
    }

    /// All positions ordered by token
    pub fn list(&self) -> Vec<Position> {
        self.positions.read().values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.read().is_empty()
    }
}
