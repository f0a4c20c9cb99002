use std::sync::Arc;

use log::{info, warn};

use crate::errors::{Result, ValidationError};
use crate::portfolios::{NewPortfolio, Portfolio, PortfolioKind, PortfolioRepositoryTrait};
use crate::sync::SyncServiceTrait;
use crate::Error;

const DEFAULT_NETWORK: &str = "ethereum";

/// Connects self-custodied wallets as portfolios and runs their first sync.
pub struct WalletService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    sync: Arc<dyn SyncServiceTrait>,
}

fn is_valid_evm_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

impl WalletService {
    pub fn new(portfolios: Arc<dyn PortfolioRepositoryTrait>, sync: Arc<dyn SyncServiceTrait>) -> Self {
        Self { portfolios, sync }
    }

    /// Registers a wallet address and attempts an initial balance sync.
    /// A transient sync failure does not undo the connection; the wallet
    /// stays registered and picks up balances on the next resync.
    pub async fn connect_wallet(
        &self,
        user_id: &str,
        address: &str,
        label: Option<&str>,
    ) -> Result<Portfolio> {
        let address = address.trim();
        if !is_valid_evm_address(address) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "'{}' is not a valid wallet address",
                address
            ))));
        }

        let name = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Wallet {}...{}", &address[..6], &address[38..]));

        let new_portfolio = NewPortfolio {
            id: None,
            user_id: user_id.to_string(),
            name,
            kind: PortfolioKind::Wallet,
            institution_id: None,
            institution_name: None,
            item_id: None,
            access_token: None,
            wallet_address: Some(address.to_lowercase()),
            network: Some(DEFAULT_NETWORK.to_string()),
        };
        new_portfolio.validate()?;
        let portfolio = self.portfolios.create(new_portfolio)?;
        info!("connected wallet portfolio {} for {}", portfolio.id, user_id);

        match self.sync.resync_portfolio(user_id, &portfolio.id, None).await {
            Ok(_) => {}
            Err(e) if e.is_retryable() => {
                warn!(
                    "initial sync of wallet {} failed, will retry on next cycle: {}",
                    portfolio.id, e
                );
            }
            Err(e) => return Err(e),
        }

        // Re-read to pick up last_synced_at from a successful first sync.
        Ok(self
            .portfolios
            .get_by_id(&portfolio.id)?
            .unwrap_or(portfolio))
    }

    /// Soft-removes a wallet: the portfolio and its history are kept but
    /// excluded from aggregation and future syncs.
    pub fn disconnect_wallet(&self, user_id: &str, portfolio_id: &str) -> Result<()> {
        let portfolio = self
            .portfolios
            .get_for_user(user_id, portfolio_id)?
            .filter(|p| p.kind == PortfolioKind::Wallet)
            .ok_or_else(|| Error::NotFound(format!("wallet portfolio {} not found", portfolio_id)))?;
        self.portfolios.deactivate(&portfolio.id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::adapters::SourceError;
    use crate::store::MemoryStore;
    use crate::sync::SyncOutcome;

    struct RecordingSync {
        calls: AtomicUsize,
        fail_transient: bool,
    }

    impl RecordingSync {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_transient: false,
            }
        }

        fn transient_failure() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_transient: true,
            }
        }
    }

    #[async_trait]
    impl SyncServiceTrait for RecordingSync {
        async fn resync_portfolio(
            &self,
            _user_id: &str,
            _portfolio_id: &str,
            _as_of: Option<NaiveDateTime>,
        ) -> crate::Result<SyncOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transient {
                Err(Error::Source(SourceError::Unavailable(
                    "rpc down".to_string(),
                )))
            } else {
                Ok(SyncOutcome::Completed {
                    total_value: Decimal::ZERO,
                })
            }
        }
    }

    const ADDRESS: &str = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B";

    #[tokio::test]
    async fn connect_creates_wallet_portfolio_and_syncs_once() {
        let store = Arc::new(MemoryStore::new());
        let sync = Arc::new(RecordingSync::ok());
        let service = WalletService::new(store.clone(), sync.clone());

        let portfolio = service
            .connect_wallet("u1", ADDRESS, Some("Cold storage"))
            .await
            .unwrap();

        assert_eq!(portfolio.kind, PortfolioKind::Wallet);
        assert_eq!(portfolio.name, "Cold storage");
        assert_eq!(
            portfolio.wallet_address.as_deref(),
            Some(ADDRESS.to_lowercase().as_str())
        );
        assert_eq!(portfolio.network.as_deref(), Some("ethereum"));
        assert_eq!(sync.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_derives_label_from_address() {
        let store = Arc::new(MemoryStore::new());
        let service = WalletService::new(store.clone(), Arc::new(RecordingSync::ok()));

        let portfolio = service.connect_wallet("u1", ADDRESS, None).await.unwrap();
        assert!(portfolio.name.starts_with("Wallet 0xAb58"));
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let sync = Arc::new(RecordingSync::ok());
        let service = WalletService::new(store.clone(), sync.clone());

        for bad in ["", "0x123", "not-an-address", "0xZZ5801a7D398351b8bE11C439e05C5B3259aeC9B"] {
            let err = service.connect_wallet("u1", bad, None).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "accepted {:?}", bad);
        }
        assert!(store.list_by_user("u1", None).unwrap().is_empty());
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_sync_failure_keeps_the_connection() {
        let store = Arc::new(MemoryStore::new());
        let service = WalletService::new(store.clone(), Arc::new(RecordingSync::transient_failure()));

        let portfolio = service.connect_wallet("u1", ADDRESS, None).await.unwrap();
        assert!(store.get_by_id(&portfolio.id).unwrap().is_some());
        assert!(portfolio.last_synced_at.is_none());
    }

    #[tokio::test]
    async fn disconnect_deactivates_but_keeps_the_portfolio() {
        let store = Arc::new(MemoryStore::new());
        let service = WalletService::new(store.clone(), Arc::new(RecordingSync::ok()));

        let portfolio = service.connect_wallet("u1", ADDRESS, None).await.unwrap();
        service.disconnect_wallet("u1", &portfolio.id).unwrap();

        let stored = store.get_by_id(&portfolio.id).unwrap().unwrap();
        assert!(!stored.is_active);

        let err = service
            .disconnect_wallet("someone-else", &portfolio.id)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
