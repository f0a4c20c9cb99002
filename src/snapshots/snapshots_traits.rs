use chrono::NaiveDateTime;

use super::snapshots_model::{
    NewPortfolioSnapshot, NewUserPortfolioSnapshot, PortfolioSnapshot, UserPortfolioSnapshot,
};
use crate::errors::StoreError;

/// Trait defining the contract for PortfolioSnapshot repository operations.
pub trait SnapshotRepositoryTrait: Send + Sync {
    fn append(&self, snapshot: NewPortfolioSnapshot) -> Result<PortfolioSnapshot, StoreError>;
    fn latest_for_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<PortfolioSnapshot>, StoreError>;
    /// Most recent snapshots first, capped at `limit`.
    fn recent_for_portfolio(
        &self,
        portfolio_id: &str,
        limit: usize,
    ) -> Result<Vec<PortfolioSnapshot>, StoreError>;
    fn delete_for_portfolio(&self, portfolio_id: &str) -> Result<(), StoreError>;
}

/// Trait defining the contract for UserPortfolioSnapshot repository operations.
pub trait UserSnapshotRepositoryTrait: Send + Sync {
    fn append(
        &self,
        snapshot: NewUserPortfolioSnapshot,
    ) -> Result<UserPortfolioSnapshot, StoreError>;
    /// Full series ascending by date, including same-day duplicates.
    fn history_for_user(&self, user_id: &str) -> Result<Vec<UserPortfolioSnapshot>, StoreError>;
    fn latest_for_user(&self, user_id: &str)
        -> Result<Option<UserPortfolioSnapshot>, StoreError>;
    /// Snapshot with the greatest date not after `at`, if any.
    fn closest_at_or_before(
        &self,
        user_id: &str,
        at: NaiveDateTime,
    ) -> Result<Option<UserPortfolioSnapshot>, StoreError>;
}
