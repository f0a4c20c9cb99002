use chrono::NaiveDateTime;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::errors::StoreError;
use crate::holdings::{Holding, HoldingDraft, HoldingRepositoryTrait};
use crate::portfolios::{NewPortfolio, Portfolio, PortfolioRepositoryTrait, PortfolioStatus};
use crate::snapshots::{
    NewPortfolioSnapshot, NewUserPortfolioSnapshot, PortfolioSnapshot, SnapshotRepositoryTrait,
    UserPortfolioSnapshot, UserSnapshotRepositoryTrait,
};

/// In-memory value store backing all repository traits.
///
/// Holdings are keyed by portfolio id, so the wholesale replacement a resync
/// performs is a single map insert and therefore atomic with respect to
/// concurrent readers.
#[derive(Default)]
pub struct MemoryStore {
    portfolios: DashMap<String, Portfolio>,
    holdings: DashMap<String, Vec<Holding>>,
    snapshots: DashMap<String, Vec<PortfolioSnapshot>>,
    user_snapshots: DashMap<String, Vec<UserPortfolioSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_portfolios_for_user(&self, user_id: &str) -> Vec<Portfolio> {
        let mut portfolios: Vec<Portfolio> = self
            .portfolios
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        portfolios.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        portfolios
    }
}

impl PortfolioRepositoryTrait for MemoryStore {
    fn create(&self, new_portfolio: NewPortfolio) -> Result<Portfolio, StoreError> {
        let portfolio: Portfolio = new_portfolio.into();
        self.portfolios
            .insert(portfolio.id.clone(), portfolio.clone());
        Ok(portfolio)
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Option<Portfolio>, StoreError> {
        Ok(self.portfolios.get(portfolio_id).map(|p| p.value().clone()))
    }

    fn get_for_user(
        &self,
        user_id: &str,
        portfolio_id: &str,
    ) -> Result<Option<Portfolio>, StoreError> {
        Ok(self
            .portfolios
            .get(portfolio_id)
            .filter(|p| p.value().user_id == user_id)
            .map(|p| p.value().clone()))
    }

    fn get_by_item_id(&self, item_id: &str) -> Result<Option<Portfolio>, StoreError> {
        Ok(self
            .portfolios
            .iter()
            .find(|entry| entry.value().item_id.as_deref() == Some(item_id))
            .map(|entry| entry.value().clone()))
    }

    fn list_by_user(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
    ) -> Result<Vec<Portfolio>, StoreError> {
        let mut portfolios = self.sorted_portfolios_for_user(user_id);
        if let Some(is_active) = is_active_filter {
            portfolios.retain(|p| p.is_active == is_active);
        }
        Ok(portfolios)
    }

    fn list_user_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut user_ids: Vec<String> = self
            .portfolios
            .iter()
            .map(|entry| entry.value().user_id.clone())
            .collect();
        user_ids.sort();
        user_ids.dedup();
        Ok(user_ids)
    }

    fn set_status(&self, portfolio_id: &str, status: PortfolioStatus) -> Result<(), StoreError> {
        let mut portfolio = self
            .portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| StoreError::Missing(format!("portfolio {}", portfolio_id)))?;
        portfolio.status = status;
        portfolio.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    fn mark_synced(
        &self,
        portfolio_id: &str,
        synced_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let mut portfolio = self
            .portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| StoreError::Missing(format!("portfolio {}", portfolio_id)))?;
        portfolio.status = PortfolioStatus::Active;
        portfolio.last_synced_at = Some(synced_at);
        portfolio.updated_at = synced_at;
        Ok(())
    }

    fn deactivate(&self, portfolio_id: &str) -> Result<(), StoreError> {
        let mut portfolio = self
            .portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| StoreError::Missing(format!("portfolio {}", portfolio_id)))?;
        portfolio.is_active = false;
        portfolio.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    fn delete(&self, portfolio_id: &str) -> Result<(), StoreError> {
        self.portfolios
            .remove(portfolio_id)
            .ok_or_else(|| StoreError::Missing(format!("portfolio {}", portfolio_id)))?;
        self.holdings.remove(portfolio_id);
        self.snapshots.remove(portfolio_id);
        Ok(())
    }
}

impl HoldingRepositoryTrait for MemoryStore {
    fn replace_for_portfolio(
        &self,
        portfolio_id: &str,
        drafts: Vec<HoldingDraft>,
    ) -> Result<Vec<Holding>, StoreError> {
        let inserted: Vec<Holding> = drafts
            .into_iter()
            .map(|draft| draft.into_holding(portfolio_id))
            .collect();
        self.holdings
            .insert(portfolio_id.to_string(), inserted.clone());
        Ok(inserted)
    }

    fn list_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Holding>, StoreError> {
        Ok(self
            .holdings
            .get(portfolio_id)
            .map(|h| h.value().clone())
            .unwrap_or_default())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Holding>, StoreError> {
        let mut result = Vec::new();
        for portfolio in self.sorted_portfolios_for_user(user_id) {
            if !portfolio.is_active {
                continue;
            }
            if let Some(holdings) = self.holdings.get(&portfolio.id) {
                result.extend(holdings.value().iter().cloned());
            }
        }
        Ok(result)
    }

    fn update_value(
        &self,
        holding_id: &str,
        value: Decimal,
        unit_price: Decimal,
    ) -> Result<Holding, StoreError> {
        for mut entry in self.holdings.iter_mut() {
            if let Some(holding) = entry.value_mut().iter_mut().find(|h| h.id == holding_id) {
                holding.value = value;
                holding.unit_price = unit_price;
                return Ok(holding.clone());
            }
        }
        Err(StoreError::Missing(format!("holding {}", holding_id)))
    }
}

impl SnapshotRepositoryTrait for MemoryStore {
    fn append(&self, snapshot: NewPortfolioSnapshot) -> Result<PortfolioSnapshot, StoreError> {
        let snapshot: PortfolioSnapshot = snapshot.into();
        self.snapshots
            .entry(snapshot.portfolio_id.clone())
            .or_default()
            .push(snapshot.clone());
        Ok(snapshot)
    }

    fn latest_for_portfolio(
        &self,
        portfolio_id: &str,
    ) -> Result<Option<PortfolioSnapshot>, StoreError> {
        Ok(self.snapshots.get(portfolio_id).and_then(|snapshots| {
            snapshots
                .value()
                .iter()
                .max_by_key(|s| s.date)
                .cloned()
        }))
    }

    fn recent_for_portfolio(
        &self,
        portfolio_id: &str,
        limit: usize,
    ) -> Result<Vec<PortfolioSnapshot>, StoreError> {
        let mut snapshots = self
            .snapshots
            .get(portfolio_id)
            .map(|s| s.value().clone())
            .unwrap_or_default();
        snapshots.sort_by(|a, b| b.date.cmp(&a.date));
        snapshots.truncate(limit);
        Ok(snapshots)
    }

    fn delete_for_portfolio(&self, portfolio_id: &str) -> Result<(), StoreError> {
        self.snapshots.remove(portfolio_id);
        Ok(())
    }
}

impl UserSnapshotRepositoryTrait for MemoryStore {
    fn append(
        &self,
        snapshot: NewUserPortfolioSnapshot,
    ) -> Result<UserPortfolioSnapshot, StoreError> {
        let snapshot: UserPortfolioSnapshot = snapshot.into();
        self.user_snapshots
            .entry(snapshot.user_id.clone())
            .or_default()
            .push(snapshot.clone());
        Ok(snapshot)
    }

    fn history_for_user(&self, user_id: &str) -> Result<Vec<UserPortfolioSnapshot>, StoreError> {
        let mut history = self
            .user_snapshots
            .get(user_id)
            .map(|s| s.value().clone())
            .unwrap_or_default();
        history.sort_by_key(|s| s.date);
        Ok(history)
    }

    fn latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<UserPortfolioSnapshot>, StoreError> {
        Ok(self.user_snapshots.get(user_id).and_then(|snapshots| {
            snapshots
                .value()
                .iter()
                .max_by_key(|s| s.date)
                .cloned()
        }))
    }

    fn closest_at_or_before(
        &self,
        user_id: &str,
        at: NaiveDateTime,
    ) -> Result<Option<UserPortfolioSnapshot>, StoreError> {
        Ok(self.user_snapshots.get(user_id).and_then(|snapshots| {
            snapshots
                .value()
                .iter()
                .filter(|s| s.date <= at)
                .max_by_key(|s| s.date)
                .cloned()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(name: &str, value: Decimal) -> HoldingDraft {
        HoldingDraft::priced(None, name.to_string(), "STOCK".to_string(), dec!(1), value)
    }

    fn manual_portfolio(store: &MemoryStore, user_id: &str, name: &str) -> Portfolio {
        store
            .create(NewPortfolio::manual(user_id, name))
            .unwrap()
    }

    #[test]
    fn replace_swaps_holdings_wholesale() {
        let store = MemoryStore::new();
        let portfolio = manual_portfolio(&store, "u1", "p1");

        store
            .replace_for_portfolio(&portfolio.id, vec![draft("a", dec!(10)), draft("b", dec!(20))])
            .unwrap();
        let replaced = store
            .replace_for_portfolio(&portfolio.id, vec![draft("c", dec!(30))])
            .unwrap();

        assert_eq!(replaced.len(), 1);
        let listed = store.list_for_portfolio(&portfolio.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "c");
    }

    #[test]
    fn delete_cascades_holdings_and_snapshots() {
        let store = MemoryStore::new();
        let portfolio = manual_portfolio(&store, "u1", "p1");
        let other = manual_portfolio(&store, "u1", "p2");

        store
            .replace_for_portfolio(&portfolio.id, vec![draft("a", dec!(10))])
            .unwrap();
        store
            .replace_for_portfolio(&other.id, vec![draft("b", dec!(20))])
            .unwrap();
        SnapshotRepositoryTrait::append(
            &store,
            NewPortfolioSnapshot {
                portfolio_id: portfolio.id.clone(),
                date: chrono::Utc::now().naive_utc(),
                total_value: dec!(10),
            },
        )
        .unwrap();

        store.delete(&portfolio.id).unwrap();

        assert!(store.get_by_id(&portfolio.id).unwrap().is_none());
        assert!(store.list_for_portfolio(&portfolio.id).unwrap().is_empty());
        assert!(store
            .latest_for_portfolio(&portfolio.id)
            .unwrap()
            .is_none());
        assert_eq!(store.list_for_portfolio(&other.id).unwrap().len(), 1);
    }

    #[test]
    fn closest_at_or_before_picks_nearest_earlier_snapshot() {
        let store = MemoryStore::new();
        let base = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        for (days, value) in [(0i64, dec!(100)), (1, dec!(110)), (3, dec!(120))] {
            UserSnapshotRepositoryTrait::append(
                &store,
                NewUserPortfolioSnapshot {
                    user_id: "u1".to_string(),
                    date: base + chrono::Duration::days(days),
                    total_value: value,
                },
            )
            .unwrap();
        }

        let found = store
            .closest_at_or_before("u1", base + chrono::Duration::days(2))
            .unwrap()
            .unwrap();
        assert_eq!(found.total_value, dec!(110));

        assert!(store
            .closest_at_or_before("u1", base - chrono::Duration::days(1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn list_for_user_skips_inactive_portfolios() {
        let store = MemoryStore::new();
        let active = manual_portfolio(&store, "u1", "active");
        let retired = manual_portfolio(&store, "u1", "retired");
        store
            .replace_for_portfolio(&active.id, vec![draft("a", dec!(10))])
            .unwrap();
        store
            .replace_for_portfolio(&retired.id, vec![draft("b", dec!(20))])
            .unwrap();

        store.deactivate(&retired.id).unwrap();

        let holdings = store.list_for_user("u1").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].name, "a");
    }
}
