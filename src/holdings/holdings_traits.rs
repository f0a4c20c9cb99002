use rust_decimal::Decimal;

use super::holdings_model::{Holding, HoldingDraft};
use crate::errors::StoreError;

/// Trait defining the contract for Holding repository operations.
pub trait HoldingRepositoryTrait: Send + Sync {
    /// Atomically replaces the portfolio's holdings with the given drafts and
    /// returns the inserted set. Concurrent readers observe either the old or
    /// the new set, never a mixture.
    fn replace_for_portfolio(
        &self,
        portfolio_id: &str,
        drafts: Vec<HoldingDraft>,
    ) -> Result<Vec<Holding>, StoreError>;
    fn list_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>, StoreError>;
    /// Holdings across all of the user's active portfolios, ordered by
    /// portfolio creation time.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Holding>, StoreError>;
    /// Identity-preserving value update for a manual portfolio's holding.
    fn update_value(
        &self,
        holding_id: &str,
        value: Decimal,
        unit_price: Decimal,
    ) -> Result<Holding, StoreError>;
}
