use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use log::{debug, error, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::sync_traits::{SyncOutcome, SyncServiceTrait};
use crate::adapters::{AdapterRegistry, SourceError};
use crate::aggregation::AggregationServiceTrait;
use crate::constants::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::errors::Result;
use crate::holdings::{HoldingDraft, HoldingRepositoryTrait};
use crate::portfolios::{Portfolio, PortfolioRepositoryTrait, PortfolioStatus};
use crate::snapshots::{NewPortfolioSnapshot, SnapshotRepositoryTrait};
use crate::Error;

/// Drives one portfolio's resync: fetch from the matching source adapter,
/// atomically replace holdings, append a portfolio snapshot, then hand off to
/// the aggregation engine.
pub struct SyncService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    holdings: Arc<dyn HoldingRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
    registry: Arc<AdapterRegistry>,
    aggregation: Arc<dyn AggregationServiceTrait>,
    // Per-portfolio exclusivity: concurrent resyncs of the same portfolio are
    // serialized, different portfolios run in parallel.
    locks: DashMap<String, Arc<Mutex<()>>>,
    fetch_timeout: Duration,
}

impl SyncService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        holdings: Arc<dyn HoldingRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
        registry: Arc<AdapterRegistry>,
        aggregation: Arc<dyn AggregationServiceTrait>,
    ) -> Self {
        Self {
            portfolios,
            holdings,
            snapshots,
            registry,
            aggregation,
            locks: DashMap::new(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    fn lock_for(&self, portfolio_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(portfolio_id.to_string())
            .or_default()
            .clone()
    }

    /// Drops the registry entry once no task holds a clone of the lock, so
    /// deleted and deactivated portfolios do not leave entries behind.
    /// `remove_if` checks the count under the shard lock, so a concurrent
    /// `lock_for` either re-uses the entry (count > 1) or recreates it after
    /// the removal.
    fn evict_lock(&self, portfolio_id: &str) {
        self.locks
            .remove_if(portfolio_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub(super) fn lock_registry_len(&self) -> usize {
        self.locks.len()
    }

    /// Replaces the holdings and records the snapshot. Failures after the
    /// replacement restore the prior holdings set so a portfolio is never
    /// left half-synced.
    fn apply_holdings(
        &self,
        portfolio: &Portfolio,
        drafts: Vec<HoldingDraft>,
        as_of: Option<NaiveDateTime>,
    ) -> Result<Decimal> {
        let previous = self.holdings.list_for_portfolio(&portfolio.id)?;
        let inserted = self.holdings.replace_for_portfolio(&portfolio.id, drafts)?;
        let total_value: Decimal = inserted.iter().map(|h| h.value).sum();

        let now = chrono::Utc::now().naive_utc();
        let record = || -> Result<()> {
            self.snapshots.append(NewPortfolioSnapshot {
                portfolio_id: portfolio.id.clone(),
                date: as_of.unwrap_or(now),
                total_value,
            })?;
            self.portfolios.mark_synced(&portfolio.id, now)?;
            Ok(())
        };

        if let Err(e) = record() {
            let restore: Vec<HoldingDraft> = previous.iter().map(HoldingDraft::from).collect();
            if let Err(restore_err) = self.holdings.replace_for_portfolio(&portfolio.id, restore) {
                error!(
                    "failed to restore holdings for {} after aborted sync: {}",
                    portfolio.id, restore_err
                );
            }
            return Err(e);
        }

        Ok(total_value)
    }

    async fn resync_locked(
        &self,
        portfolio: &Portfolio,
        as_of: Option<NaiveDateTime>,
    ) -> Result<SyncOutcome> {
        let adapter = self.registry.resolve(portfolio.kind)?;
        debug!("resyncing portfolio {} ({})", portfolio.id, portfolio.kind);

        let fetched = match timeout(self.fetch_timeout, adapter.fetch_holdings(portfolio)).await {
            Ok(result) => result,
            // A stalled upstream must not hold the portfolio lock forever.
            Err(_) => Err(SourceError::Unavailable(
                "sync source timed out".to_string(),
            )),
        };

        match fetched {
            Ok(drafts) => {
                let total_value = self.apply_holdings(portfolio, drafts, as_of)?;
                self.aggregation
                    .recompute_user_snapshot(&portfolio.user_id)
                    .await?;
                Ok(SyncOutcome::Completed { total_value })
            }
            Err(SourceError::AuthExpired) => {
                // Keep holdings and history; the user has to relink.
                warn!("credential expired for portfolio {}", portfolio.id);
                self.portfolios
                    .set_status(&portfolio.id, PortfolioStatus::NeedsReauth)?;
                Ok(SyncOutcome::ReauthRequired)
            }
            Err(e) => {
                // Transient: no state mutation, retry policy belongs to the trigger.
                warn!("resync of portfolio {} failed: {}", portfolio.id, e);
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn resync_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        as_of: Option<NaiveDateTime>,
    ) -> Result<SyncOutcome> {
        let portfolio = self
            .portfolios
            .get_for_user(user_id, portfolio_id)?
            .ok_or_else(|| Error::NotFound(format!("portfolio {} not found", portfolio_id)))?;

        let lock = self.lock_for(&portfolio.id);
        let guard = lock.lock().await;
        let result = self.resync_locked(&portfolio, as_of).await;
        drop(guard);
        drop(lock);
        self.evict_lock(&portfolio.id);

        result
    }
}
