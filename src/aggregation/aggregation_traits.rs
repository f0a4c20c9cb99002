use async_trait::async_trait;

use super::aggregation_model::{AllocationSlice, DailyAggregationOutcome, HoldingView};
use crate::errors::Result;
use crate::snapshots::UserPortfolioSnapshot;

/// Trait defining the contract for the aggregation engine.
///
/// Injected into the sync orchestrator and the manual/wallet operations as an
/// explicit constructor dependency.
#[async_trait]
pub trait AggregationServiceTrait: Send + Sync {
    /// Sums current holdings across all of the user's active portfolios and
    /// appends one user-level snapshot. Must be invoked after every event
    /// that changes the user's portfolio composition.
    async fn recompute_user_snapshot(&self, user_id: &str) -> Result<UserPortfolioSnapshot>;
    fn compute_allocation(&self, user_id: &str) -> Result<Vec<AllocationSlice>>;
    fn compute_holdings_list(&self, user_id: &str) -> Result<Vec<HoldingView>>;
    /// Guarantees at least one user snapshot per day even when nothing
    /// changed; per-user failures are collected, not fatal.
    async fn run_daily_aggregation(&self) -> Result<DailyAggregationOutcome>;
}
