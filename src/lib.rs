//! Pair Sentinel Library
//!
//! Safety screening for newly listed token pairs: a local blacklist, risk
//! and market data from external services, and a configurable policy decide
//! whether an address may be watched.
//! This library exposes core modules for the binary and for testing.

pub mod blacklist;
pub mod bot;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod monitor;
pub mod notifications;
pub mod policy;
pub mod sources;
pub mod watchlist;

// Re-export commonly used types for tests
pub use blacklist::{BlacklistHit, BlacklistStore};
pub use config::{AppConfig, BlacklistConfig};
pub use error::{AppError, AppResult, FetchError};
pub use evaluator::SafetyEvaluator;
pub use metrics::MetricsState;
pub use models::{DataSource, MarketReport, RiskReport, Rule, TokenAddress, Verdict};
pub use notifications::{CompositeNotifier, NotificationEvent};
pub use policy::{Policy, PolicyField, PolicyStore};
pub use sources::{MarketSource, RiskSource};
pub use watchlist::{PositionBook, Watchlist};
