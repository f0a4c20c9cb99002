use chrono::NaiveDateTime;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioStatus};
use crate::errors::StoreError;

/// Trait defining the contract for Portfolio repository operations.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio, StoreError>;
    fn get_by_id(&self, portfolio_id: &str) -> Result<Option<Portfolio>, StoreError>;
    /// Lookup scoped to the owning user; foreign portfolios resolve to `None`.
    fn get_for_user(&self, user_id: &str, portfolio_id: &str)
        -> Result<Option<Portfolio>, StoreError>;
    fn get_by_item_id(&self, item_id: &str) -> Result<Option<Portfolio>, StoreError>;
    /// Portfolios owned by the user, ordered by creation time.
    fn list_by_user(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
    ) -> Result<Vec<Portfolio>, StoreError>;
    /// Distinct owners across all portfolios, for the daily aggregation job.
    fn list_user_ids(&self) -> Result<Vec<String>, StoreError>;
    fn set_status(&self, portfolio_id: &str, status: PortfolioStatus) -> Result<(), StoreError>;
    /// Marks a successful sync: status back to `Active`, `last_synced_at` set.
    fn mark_synced(&self, portfolio_id: &str, synced_at: NaiveDateTime)
        -> Result<(), StoreError>;
    fn deactivate(&self, portfolio_id: &str) -> Result<(), StoreError>;
    /// Removes the portfolio together with its holdings and snapshots.
    fn delete(&self, portfolio_id: &str) -> Result<(), StoreError>;
}
