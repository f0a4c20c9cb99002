use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use rust_decimal::Decimal;

use super::aggregation_model::{AllocationSlice, DailyAggregationOutcome, HoldingView};
use super::aggregation_traits::AggregationServiceTrait;
use crate::constants::DEFAULT_CATEGORY;
use crate::errors::Result;
use crate::holdings::HoldingRepositoryTrait;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::snapshots::{
    NewUserPortfolioSnapshot, UserPortfolioSnapshot, UserSnapshotRepositoryTrait,
};

/// Rolls per-portfolio holdings into per-user totals and derived views.
pub struct AggregationService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    holdings: Arc<dyn HoldingRepositoryTrait>,
    user_snapshots: Arc<dyn UserSnapshotRepositoryTrait>,
}

impl AggregationService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        holdings: Arc<dyn HoldingRepositoryTrait>,
        user_snapshots: Arc<dyn UserSnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            portfolios,
            holdings,
            user_snapshots,
        }
    }

    fn current_total(&self, user_id: &str) -> Result<Decimal> {
        let holdings = self.holdings.list_for_user(user_id)?;
        Ok(holdings.iter().map(|h| h.value).sum())
    }
}

#[async_trait]
impl AggregationServiceTrait for AggregationService {
    async fn recompute_user_snapshot(&self, user_id: &str) -> Result<UserPortfolioSnapshot> {
        let total_value = self.current_total(user_id)?;
        debug!("recomputing user snapshot for {}: {}", user_id, total_value);
        let snapshot = self.user_snapshots.append(NewUserPortfolioSnapshot {
            user_id: user_id.to_string(),
            date: chrono::Utc::now().naive_utc(),
            total_value,
        })?;
        Ok(snapshot)
    }

    fn compute_allocation(&self, user_id: &str) -> Result<Vec<AllocationSlice>> {
        let holdings = self.holdings.list_for_user(user_id)?;

        let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut total_value = Decimal::ZERO;
        for holding in &holdings {
            let category = if holding.category.trim().is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                holding.category.clone()
            };
            *categories.entry(category).or_insert(Decimal::ZERO) += holding.value;
            total_value += holding.value;
        }

        Ok(categories
            .into_iter()
            .map(|(category, value)| AllocationSlice {
                category,
                value,
                percentage: if total_value > Decimal::ZERO {
                    value / total_value
                } else {
                    Decimal::ZERO
                },
            })
            .collect())
    }

    fn compute_holdings_list(&self, user_id: &str) -> Result<Vec<HoldingView>> {
        let portfolios = self.portfolios.list_by_user(user_id, Some(true))?;

        let mut views = Vec::new();
        for portfolio in &portfolios {
            let source = portfolio.source_label();
            for holding in self.holdings.list_for_portfolio(&portfolio.id)? {
                views.push(HoldingView {
                    id: holding.id,
                    portfolio_id: portfolio.id.clone(),
                    portfolio_name: portfolio.name.clone(),
                    portfolio_kind: portfolio.kind,
                    ticker: holding.ticker,
                    name: holding.name,
                    category: holding.category,
                    quantity: holding.quantity,
                    unit_price: holding.unit_price,
                    value: holding.value,
                    source: source.clone(),
                });
            }
        }
        Ok(views)
    }

    async fn run_daily_aggregation(&self) -> Result<DailyAggregationOutcome> {
        let user_ids = self.portfolios.list_user_ids()?;
        let mut failures = Vec::new();
        for user_id in &user_ids {
            if let Err(e) = self.recompute_user_snapshot(user_id).await {
                error!("daily aggregation failed for {}: {}", user_id, e);
                failures.push((user_id.clone(), e.to_string()));
            }
        }
        Ok(DailyAggregationOutcome {
            users_processed: user_ids.len(),
            failures,
        })
    }
}
