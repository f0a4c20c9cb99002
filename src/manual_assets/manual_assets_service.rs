use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use super::manual_assets_model::ManualAsset;
use crate::adapters::{normalize_manual_input, ManualAssetInput};
use crate::aggregation::AggregationServiceTrait;
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Result, StoreError, ValidationError};
use crate::holdings::{Holding, HoldingRepositoryTrait};
use crate::portfolios::{NewPortfolio, Portfolio, PortfolioKind, PortfolioRepositoryTrait};
use crate::snapshots::{NewPortfolioSnapshot, SnapshotRepositoryTrait};
use crate::Error;

/// Operations on user-entered assets. Every mutation records a portfolio
/// snapshot and recomputes the user-level snapshot.
pub struct ManualAssetService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    holdings: Arc<dyn HoldingRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
    aggregation: Arc<dyn AggregationServiceTrait>,
}

impl ManualAssetService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        holdings: Arc<dyn HoldingRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
        aggregation: Arc<dyn AggregationServiceTrait>,
    ) -> Self {
        Self {
            portfolios,
            holdings,
            snapshots,
            aggregation,
        }
    }

    fn get_manual_portfolio(&self, user_id: &str, portfolio_id: &str) -> Result<Portfolio> {
        self.portfolios
            .get_for_user(user_id, portfolio_id)?
            .filter(|p| p.kind == PortfolioKind::Manual)
            .ok_or_else(|| {
                Error::NotFound(format!("manual portfolio {} not found", portfolio_id))
            })
    }

    pub async fn create(&self, user_id: &str, input: ManualAssetInput) -> Result<ManualAsset> {
        // Validation rejects before any store mutation.
        let draft = normalize_manual_input(&input)?;
        let new_portfolio = NewPortfolio::manual(user_id, input.name.trim());
        new_portfolio.validate()?;

        let portfolio = self.portfolios.create(new_portfolio)?;
        debug!("created manual portfolio {} for {}", portfolio.id, user_id);

        let holding = self
            .holdings
            .replace_for_portfolio(&portfolio.id, vec![draft])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Store(StoreError::Internal(
                    "manual holding was not inserted".to_string(),
                ))
            })?;

        self.snapshots.append(NewPortfolioSnapshot {
            portfolio_id: portfolio.id.clone(),
            date: input.as_of.unwrap_or_else(|| chrono::Utc::now().naive_utc()),
            total_value: holding.value,
        })?;

        self.aggregation.recompute_user_snapshot(user_id).await?;

        Ok(ManualAsset { portfolio, holding })
    }

    /// Re-values the asset's single holding in place. The one exception to
    /// wholesale replacement: a manual portfolio has exactly one holding by
    /// construction, and it keeps its identity across updates.
    pub async fn update_value(
        &self,
        user_id: &str,
        portfolio_id: &str,
        new_value: Decimal,
    ) -> Result<Holding> {
        if new_value <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Asset value must be positive".to_string(),
            )));
        }
        let portfolio = self.get_manual_portfolio(user_id, portfolio_id)?;

        let holding = self
            .holdings
            .list_for_portfolio(&portfolio.id)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::NotFound(format!("manual portfolio {} has no holding", portfolio.id))
            })?;

        let unit_price = (new_value / holding.quantity).round_dp(DECIMAL_PRECISION);
        let updated = self
            .holdings
            .update_value(&holding.id, new_value, unit_price)?;

        self.snapshots.append(NewPortfolioSnapshot {
            portfolio_id: portfolio.id.clone(),
            date: chrono::Utc::now().naive_utc(),
            total_value: new_value,
        })?;

        self.aggregation.recompute_user_snapshot(user_id).await?;

        Ok(updated)
    }

    /// Hard delete, manual portfolios only; cascades to holdings and
    /// portfolio snapshots but leaves the user-level history intact.
    pub async fn delete(&self, user_id: &str, portfolio_id: &str) -> Result<()> {
        let portfolio = self.get_manual_portfolio(user_id, portfolio_id)?;
        self.portfolios.delete(&portfolio.id)?;
        self.aggregation.recompute_user_snapshot(user_id).await?;
        Ok(())
    }

    /// Manual assets newest-first.
    pub fn list(&self, user_id: &str) -> Result<Vec<ManualAsset>> {
        let mut portfolios = self.portfolios.list_by_user(user_id, Some(true))?;
        portfolios.retain(|p| p.kind == PortfolioKind::Manual);
        portfolios.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut assets = Vec::with_capacity(portfolios.len());
        for portfolio in portfolios {
            if let Some(holding) = self
                .holdings
                .list_for_portfolio(&portfolio.id)?
                .into_iter()
                .next()
            {
                assets.push(ManualAsset { portfolio, holding });
            }
        }
        Ok(assets)
    }
}
