use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("price not found for {0}")]
    NotFound(String),
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        MarketDataError::Provider(e.to_string())
    }
}

/// Spot-price lookup by provider asset id (e.g. "ethereum").
/// `NotFound` is distinct from transient provider failure.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_spot_price(&self, asset_id: &str) -> Result<Decimal, MarketDataError>;
}

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn get_spot_price(&self, asset_id: &str) -> Result<Decimal, MarketDataError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, asset_id
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(MarketDataError::Provider(format!(
                "price endpoint returned {}",
                response.status()
            )));
        }

        let prices: HashMap<String, HashMap<String, Decimal>> = response
            .json()
            .await
            .map_err(|e| MarketDataError::Provider(e.to_string()))?;

        prices
            .get(asset_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| MarketDataError::NotFound(asset_id.to_string()))
    }
}
