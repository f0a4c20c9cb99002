use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::source_adapter::{SourceError, SyncSource};
use crate::constants::{CRYPTO_CATEGORY, DECIMAL_PRECISION};
use crate::holdings::HoldingDraft;
use crate::portfolios::Portfolio;
use crate::providers::{ChainRpcClient, MarketDataProvider};

/// One token contract the wallet adapter tracks alongside the base asset.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub name: String,
    pub contract: String,
    pub decimals: u32,
    /// Fixed quote for pegged assets; skips the price lookup entirely.
    pub fixed_price: Option<Decimal>,
    pub price_id: Option<String>,
}

/// Wallet adapter configuration. The fallback price is injected so callers
/// and tests control what a failed price lookup resolves to.
#[derive(Debug, Clone)]
pub struct WalletAdapterConfig {
    pub base_symbol: String,
    pub base_name: String,
    pub base_decimals: u32,
    pub base_price_id: String,
    pub fallback_price: Decimal,
    pub tokens: Vec<TokenConfig>,
}

impl Default for WalletAdapterConfig {
    fn default() -> Self {
        Self {
            base_symbol: "ETH".to_string(),
            base_name: "Ethereum".to_string(),
            base_decimals: 18,
            base_price_id: "ethereum".to_string(),
            fallback_price: dec!(2500),
            tokens: vec![TokenConfig {
                symbol: "USDC".to_string(),
                name: "USD Coin".to_string(),
                contract: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
                decimals: 6,
                fixed_price: Some(Decimal::ONE),
                price_id: None,
            }],
        }
    }
}

/// Sync source for self-custodied on-chain wallets.
pub struct WalletAdapter {
    chain: Arc<dyn ChainRpcClient>,
    prices: Arc<dyn MarketDataProvider>,
    config: WalletAdapterConfig,
}

impl WalletAdapter {
    pub fn new(
        chain: Arc<dyn ChainRpcClient>,
        prices: Arc<dyn MarketDataProvider>,
        config: WalletAdapterConfig,
    ) -> Self {
        Self {
            chain,
            prices,
            config,
        }
    }

    /// Price lookup failures never propagate; the configured fallback is used
    /// instead.
    async fn resolve_price(&self, fixed: Option<Decimal>, price_id: Option<&str>) -> Decimal {
        if let Some(price) = fixed {
            return price;
        }
        let Some(price_id) = price_id else {
            return self.config.fallback_price;
        };
        match self.prices.get_spot_price(price_id).await {
            Ok(price) => price,
            Err(e) => {
                warn!(
                    "price lookup for {} failed, using fallback: {}",
                    price_id, e
                );
                self.config.fallback_price
            }
        }
    }
}

/// Converts a raw base-unit balance to a decimal quantity. Balances beyond
/// Decimal's 96-bit mantissa are reported as transient failures, never a
/// panic.
fn to_quantity(raw: u128, decimals: u32) -> Result<Decimal, SourceError> {
    let raw = i128::try_from(raw)
        .map_err(|_| SourceError::Unavailable("balance exceeds representable range".to_string()))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|quantity| quantity.normalize())
        .map_err(|e| SourceError::Unavailable(e.to_string()))
}

#[async_trait]
impl SyncSource for WalletAdapter {
    async fn fetch_holdings(
        &self,
        portfolio: &Portfolio,
    ) -> Result<Vec<HoldingDraft>, SourceError> {
        let address = portfolio.wallet_address.as_deref().ok_or_else(|| {
            SourceError::Unavailable("wallet portfolio has no address".to_string())
        })?;

        let base_fut = self.chain.get_base_balance(address);
        let token_futs = try_join_all(
            self.config
                .tokens
                .iter()
                .map(|token| self.chain.get_token_balance(address, &token.contract)),
        );
        let (base_raw, token_raws) = futures::future::try_join(base_fut, token_futs)
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let mut drafts = Vec::new();

        // Zero-balance assets are omitted, not recorded as zero-value holdings.
        let base_quantity = to_quantity(base_raw, self.config.base_decimals)?;
        if base_quantity > Decimal::ZERO {
            let price = self
                .resolve_price(None, Some(&self.config.base_price_id))
                .await;
            drafts.push(HoldingDraft::priced(
                Some(self.config.base_symbol.clone()),
                self.config.base_name.clone(),
                CRYPTO_CATEGORY.to_string(),
                base_quantity,
                price.round_dp(DECIMAL_PRECISION),
            ));
        }

        for (token, raw) in self.config.tokens.iter().zip(token_raws) {
            let quantity = to_quantity(raw, token.decimals)?;
            if quantity <= Decimal::ZERO {
                continue;
            }
            let price = self
                .resolve_price(token.fixed_price, token.price_id.as_deref())
                .await;
            drafts.push(HoldingDraft::priced(
                Some(token.symbol.clone()),
                token.name.clone(),
                CRYPTO_CATEGORY.to_string(),
                quantity,
                price.round_dp(DECIMAL_PRECISION),
            ));
        }

        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolios::{NewPortfolio, PortfolioKind};
    use crate::providers::{ChainRpcError, MarketDataError};

    struct MockChain {
        base: u128,
        token: u128,
        fail: bool,
    }

    #[async_trait]
    impl ChainRpcClient for MockChain {
        async fn get_base_balance(&self, _address: &str) -> Result<u128, ChainRpcError> {
            if self.fail {
                return Err(ChainRpcError::Request("node down".to_string()));
            }
            Ok(self.base)
        }
        async fn get_token_balance(
            &self,
            _address: &str,
            _contract: &str,
        ) -> Result<u128, ChainRpcError> {
            Ok(self.token)
        }
    }

    struct MockPrices {
        price: Option<Decimal>,
    }

    #[async_trait]
    impl MarketDataProvider for MockPrices {
        async fn get_spot_price(&self, asset_id: &str) -> Result<Decimal, MarketDataError> {
            self.price
                .ok_or_else(|| MarketDataError::Provider(format!("no quote for {}", asset_id)))
        }
    }

    fn wallet_portfolio() -> Portfolio {
        NewPortfolio {
            id: None,
            user_id: "u1".to_string(),
            name: "Cold wallet".to_string(),
            kind: PortfolioKind::Wallet,
            institution_id: None,
            institution_name: None,
            item_id: None,
            access_token: None,
            wallet_address: Some("0x000102030405060708090a0b0c0d0e0f10111213".to_string()),
            network: Some("ethereum".to_string()),
        }
        .into()
    }

    fn adapter(chain: MockChain, prices: MockPrices) -> WalletAdapter {
        WalletAdapter::new(
            Arc::new(chain),
            Arc::new(prices),
            WalletAdapterConfig::default(),
        )
    }

    #[tokio::test]
    async fn omits_zero_balances() {
        let adapter = adapter(
            MockChain {
                base: 1_500_000_000_000_000_000, // 1.5 ETH
                token: 0,
                fail: false,
            },
            MockPrices {
                price: Some(dec!(2000)),
            },
        );

        let drafts = adapter.fetch_holdings(&wallet_portfolio()).await.unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].ticker.as_deref(), Some("ETH"));
        assert_eq!(drafts[0].quantity, dec!(1.5));
        assert_eq!(drafts[0].value, dec!(3000));
    }

    #[tokio::test]
    async fn converts_token_decimals() {
        let adapter = adapter(
            MockChain {
                base: 0,
                token: 2_250_000, // 2.25 USDC
                fail: false,
            },
            MockPrices { price: None },
        );

        let drafts = adapter.fetch_holdings(&wallet_portfolio()).await.unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].ticker.as_deref(), Some("USDC"));
        assert_eq!(drafts[0].quantity, dec!(2.25));
        assert_eq!(drafts[0].unit_price, Decimal::ONE);
        assert_eq!(drafts[0].value, dec!(2.25));
    }

    #[tokio::test]
    async fn price_failure_soft_fails_to_configured_fallback() {
        let adapter = adapter(
            MockChain {
                base: 2_000_000_000_000_000_000, // 2 ETH
                token: 0,
                fail: false,
            },
            MockPrices { price: None },
        );

        let drafts = adapter.fetch_holdings(&wallet_portfolio()).await.unwrap();

        assert_eq!(drafts[0].unit_price, dec!(2500));
        assert_eq!(drafts[0].value, dec!(5000));
    }

    #[test]
    fn quantity_conversion_rejects_oversized_mantissa() {
        assert!(to_quantity((1u128 << 96) - 1, 18).is_ok());
        assert!(matches!(
            to_quantity(1u128 << 96, 18),
            Err(SourceError::Unavailable(_))
        ));
        assert!(matches!(
            to_quantity(u128::MAX, 18),
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn oversized_balance_fails_transient_instead_of_panicking() {
        let adapter = adapter(
            MockChain {
                base: 1u128 << 100,
                token: 0,
                fail: false,
            },
            MockPrices {
                price: Some(dec!(2000)),
            },
        );

        let result = adapter.fetch_holdings(&wallet_portfolio()).await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn balance_failure_is_transient() {
        let adapter = adapter(
            MockChain {
                base: 0,
                token: 0,
                fail: true,
            },
            MockPrices {
                price: Some(dec!(2000)),
            },
        );

        let result = adapter.fetch_holdings(&wallet_portfolio()).await;
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }
}
