use std::sync::Arc;

use rust_decimal::Decimal;

use super::history_model::{
    HistoryPoint, HistoryRange, PortfolioDetail, PortfolioOverview, PortfolioSummary,
};
use crate::constants::{DEFAULT_CURRENCY, PORTFOLIO_SNAPSHOT_CHART_LIMIT};
use crate::errors::Result;
use crate::holdings::HoldingRepositoryTrait;
use crate::portfolios::PortfolioRepositoryTrait;
use crate::snapshots::{SnapshotRepositoryTrait, UserSnapshotRepositoryTrait};
use crate::Error;

/// Read-only derivations over the value store: summary, history series,
/// portfolio detail. Writes nothing.
pub struct HistoryService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    holdings: Arc<dyn HoldingRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
    user_snapshots: Arc<dyn UserSnapshotRepositoryTrait>,
}

impl HistoryService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        holdings: Arc<dyn HoldingRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
        user_snapshots: Arc<dyn UserSnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            portfolios,
            holdings,
            snapshots,
            user_snapshots,
        }
    }

    pub fn get_summary(&self, user_id: &str) -> Result<PortfolioSummary> {
        let holdings = self.holdings.list_for_user(user_id)?;
        let total_value: Decimal = holdings.iter().map(|h| h.value).sum();

        let now = chrono::Utc::now().naive_utc();
        let reference = self
            .user_snapshots
            .closest_at_or_before(user_id, now - chrono::Duration::hours(24))?;

        let (change_24h, change_percent_24h) = match reference {
            Some(snapshot) => {
                let change = total_value - snapshot.total_value;
                let percent = if snapshot.total_value != Decimal::ZERO {
                    change / snapshot.total_value
                } else {
                    Decimal::ZERO
                };
                (change, percent)
            }
            None => (Decimal::ZERO, Decimal::ZERO),
        };

        Ok(PortfolioSummary {
            total_value,
            currency: DEFAULT_CURRENCY.to_string(),
            change_24h,
            change_percent_24h,
            last_updated: now,
        })
    }

    /// Ascending user-snapshot series, window-filtered but never resampled:
    /// one point per stored snapshot, same-day duplicates included.
    pub fn get_history(&self, user_id: &str, range: HistoryRange) -> Result<Vec<HistoryPoint>> {
        let history = self.user_snapshots.history_for_user(user_id)?;
        let cutoff = range
            .window()
            .map(|window| chrono::Utc::now().naive_utc() - window);

        Ok(history
            .into_iter()
            .filter(|s| cutoff.map(|c| s.date >= c).unwrap_or(true))
            .map(|s| HistoryPoint {
                date: s.date,
                value: s.total_value,
            })
            .collect())
    }

    pub fn list_portfolios(&self, user_id: &str) -> Result<Vec<PortfolioOverview>> {
        let portfolios = self.portfolios.list_by_user(user_id, None)?;

        let mut overviews = Vec::with_capacity(portfolios.len());
        for portfolio in portfolios {
            let holdings = self.holdings.list_for_portfolio(&portfolio.id)?;
            let total_value = holdings.iter().map(|h| h.value).sum();
            let latest_snapshot = self
                .snapshots
                .latest_for_portfolio(&portfolio.id)?
                .map(|s| HistoryPoint {
                    date: s.date,
                    value: s.total_value,
                });
            overviews.push(PortfolioOverview {
                portfolio,
                total_value,
                latest_snapshot,
            });
        }
        Ok(overviews)
    }

    pub fn get_portfolio_by_id(&self, user_id: &str, portfolio_id: &str) -> Result<PortfolioDetail> {
        let portfolio = self
            .portfolios
            .get_for_user(user_id, portfolio_id)?
            .ok_or_else(|| Error::NotFound(format!("portfolio {} not found", portfolio_id)))?;

        let holdings = self.holdings.list_for_portfolio(&portfolio.id)?;
        let total_value = holdings.iter().map(|h| h.value).sum();

        let mut snapshots: Vec<HistoryPoint> = self
            .snapshots
            .recent_for_portfolio(&portfolio.id, PORTFOLIO_SNAPSHOT_CHART_LIMIT)?
            .into_iter()
            .map(|s| HistoryPoint {
                date: s.date,
                value: s.total_value,
            })
            .collect();
        snapshots.reverse();

        Ok(PortfolioDetail {
            portfolio,
            total_value,
            holdings,
            snapshots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::HoldingDraft;
    use crate::portfolios::NewPortfolio;
    use crate::snapshots::{NewPortfolioSnapshot, NewUserPortfolioSnapshot};
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn service(store: &Arc<MemoryStore>) -> HistoryService {
        HistoryService::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    fn seed_user_snapshot(store: &MemoryStore, user_id: &str, hours_ago: i64, value: Decimal) {
        UserSnapshotRepositoryTrait::append(
            store,
            NewUserPortfolioSnapshot {
                user_id: user_id.to_string(),
                date: chrono::Utc::now().naive_utc() - chrono::Duration::hours(hours_ago),
                total_value: value,
            },
        )
        .unwrap();
    }

    #[test]
    fn history_is_ascending_and_window_filtered() {
        let store = Arc::new(MemoryStore::new());
        seed_user_snapshot(&store, "u1", 24 * 60, dec!(50)); // ~2 months back
        seed_user_snapshot(&store, "u1", 24 * 10, dec!(80));
        seed_user_snapshot(&store, "u1", 24, dec!(100));

        let month = service(&store).get_history("u1", HistoryRange::OneMonth).unwrap();
        assert_eq!(month.len(), 2);
        assert!(month[0].date < month[1].date);
        assert_eq!(month[0].value, dec!(80));

        let all = service(&store).get_history("u1", HistoryRange::All).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn range_parses_from_api_strings() {
        assert_eq!("1M".parse::<HistoryRange>().unwrap(), HistoryRange::OneMonth);
        assert_eq!("all".parse::<HistoryRange>().unwrap(), HistoryRange::All);
        assert!("2X".parse::<HistoryRange>().is_err());
        assert_eq!(HistoryRange::default(), HistoryRange::OneMonth);
    }

    #[test]
    fn summary_diffs_against_snapshot_nearest_24h_prior() {
        let store = Arc::new(MemoryStore::new());
        let portfolio = store.create(NewPortfolio::manual("u1", "p")).unwrap();
        store
            .replace_for_portfolio(
                &portfolio.id,
                vec![HoldingDraft::priced(
                    None,
                    "a".into(),
                    "STOCK".into(),
                    dec!(1),
                    dec!(120),
                )],
            )
            .unwrap();
        // closer snapshot inside the 24h window must be ignored
        seed_user_snapshot(&store, "u1", 2, dec!(115));
        seed_user_snapshot(&store, "u1", 25, dec!(100));
        seed_user_snapshot(&store, "u1", 48, dec!(90));

        let summary = service(&store).get_summary("u1").unwrap();

        assert_eq!(summary.total_value, dec!(120));
        assert_eq!(summary.change_24h, dec!(20));
        assert_eq!(summary.change_percent_24h, dec!(0.2));
        assert_eq!(summary.currency, "USD");
    }

    #[test]
    fn summary_is_flat_without_prior_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let summary = service(&store).get_summary("u1").unwrap();
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert_eq!(summary.change_24h, Decimal::ZERO);
        assert_eq!(summary.change_percent_24h, Decimal::ZERO);
    }

    #[test]
    fn portfolio_detail_reorders_capped_snapshots_for_charting() {
        let store = Arc::new(MemoryStore::new());
        let portfolio = store.create(NewPortfolio::manual("u1", "p")).unwrap();
        let base = chrono::Utc::now().naive_utc();
        for i in 0..40 {
            SnapshotRepositoryTrait::append(
                store.as_ref(),
                NewPortfolioSnapshot {
                    portfolio_id: portfolio.id.clone(),
                    date: base - chrono::Duration::days(40 - i),
                    total_value: Decimal::from(i),
                },
            )
            .unwrap();
        }

        let detail = service(&store)
            .get_portfolio_by_id("u1", &portfolio.id)
            .unwrap();

        // 30 most recent, ascending
        assert_eq!(detail.snapshots.len(), 30);
        assert_eq!(detail.snapshots[0].value, Decimal::from(10));
        assert_eq!(detail.snapshots[29].value, Decimal::from(39));
        assert!(detail.snapshots[0].date < detail.snapshots[29].date);
    }

    #[test]
    fn portfolio_detail_is_owner_scoped() {
        let store = Arc::new(MemoryStore::new());
        let portfolio = store.create(NewPortfolio::manual("u1", "p")).unwrap();

        let err = service(&store)
            .get_portfolio_by_id("someone-else", &portfolio.id)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn overview_rows_carry_latest_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let portfolio = store.create(NewPortfolio::manual("u1", "p")).unwrap();
        store
            .replace_for_portfolio(
                &portfolio.id,
                vec![HoldingDraft::priced(
                    None,
                    "a".into(),
                    "STOCK".into(),
                    dec!(2),
                    dec!(5),
                )],
            )
            .unwrap();
        SnapshotRepositoryTrait::append(
            store.as_ref(),
            NewPortfolioSnapshot {
                portfolio_id: portfolio.id.clone(),
                date: chrono::Utc::now().naive_utc(),
                total_value: dec!(10),
            },
        )
        .unwrap();

        let overviews = service(&store).list_portfolios("u1").unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].total_value, dec!(10));
        assert_eq!(overviews[0].latest_snapshot.as_ref().unwrap().value, dec!(10));
    }
}
