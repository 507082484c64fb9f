/// External service endpoints
pub mod endpoints {
    /// Rugcheck risk-scoring API
    pub const RUGCHECK_API: &str = "https://api.rugcheck.xyz/api/v1";
    /// DexScreener market-data API
    pub const DEXSCREENER_API: &str = "https://api.dexscreener.com/latest/dex";
    /// Telegram Bot API
    pub const TELEGRAM_API: &str = "https://api.telegram.org";
}

/// Chain identifier used in DexScreener pair URLs
pub const DEFAULT_CHAIN: &str = "solana";

/// Per-request timeout for source fetches (milliseconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Values assumed when the risk service omits a field.
///
/// Each one is chosen so that the corresponding rule cannot pass on it.
pub mod fail_closed {
    /// Missing `riskScore`
    pub const RISK_SCORE: f64 = 100.0;
    /// Missing `isMintable`
    pub const IS_MINTABLE: bool = true;
    /// Missing `isFreezable`
    pub const IS_FREEZABLE: bool = true;
    /// Missing `liquidityLockScore`
    pub const LIQUIDITY_LOCK_SCORE: f64 = 0.0;
    /// Missing `holdersDistributionScore`
    pub const HOLDERS_DISTRIBUTION_SCORE: f64 = 0.0;
    /// Missing `ownerBurn`
    pub const OWNER_BURN: bool = false;
    /// Missing `verified`
    pub const VERIFIED: bool = false;
}

/// Longest accepted token/pair address
pub const MAX_ADDRESS_LEN: usize = 128;
