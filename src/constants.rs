/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Reporting currency for summaries and snapshots
pub const DEFAULT_CURRENCY: &str = "USD";

/// Category assigned to holdings with no asset-class information
pub const DEFAULT_CATEGORY: &str = "OTHER";

/// Category assigned to linked-account securities with an unknown type
pub const LINKED_DEFAULT_CATEGORY: &str = "STOCK";

/// Category assigned to on-chain wallet balances
pub const CRYPTO_CATEGORY: &str = "CRYPTO";

/// Source label shown for manual portfolios
pub const MANUAL_SOURCE_LABEL: &str = "Manual";

/// Number of portfolio snapshots returned for charting
pub const PORTFOLIO_SNAPSHOT_CHART_LIMIT: usize = 30;

/// Upper bound on a single sync-source fetch
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
