use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use rust_decimal::Decimal;

use super::source_adapter::{SourceError, SyncSource};
use crate::cipher::CredentialCipher;
use crate::constants::{DECIMAL_PRECISION, LINKED_DEFAULT_CATEGORY};
use crate::holdings::HoldingDraft;
use crate::portfolios::Portfolio;
use crate::providers::{AggregatorClient, AggregatorSecurity};

/// Sync source for aggregator-linked brokerage accounts.
pub struct LinkedAccountAdapter {
    aggregator: Arc<dyn AggregatorClient>,
    cipher: CredentialCipher,
}

impl LinkedAccountAdapter {
    pub fn new(aggregator: Arc<dyn AggregatorClient>, cipher: CredentialCipher) -> Self {
        Self { aggregator, cipher }
    }
}

#[async_trait]
impl SyncSource for LinkedAccountAdapter {
    async fn fetch_holdings(
        &self,
        portfolio: &Portfolio,
    ) -> Result<Vec<HoldingDraft>, SourceError> {
        let encrypted = portfolio.access_token.as_deref().ok_or_else(|| {
            SourceError::Unavailable("linked portfolio has no access credential".to_string())
        })?;
        let access_token = self.cipher.decrypt(encrypted).map_err(|e| {
            error!("failed to decrypt access credential for {}: {}", portfolio.id, e);
            SourceError::Unavailable(e.to_string())
        })?;

        let response = self.aggregator.fetch_holdings(&access_token).await?;
        debug!(
            "aggregator returned {} holdings across {} securities for {}",
            response.holdings.len(),
            response.securities.len(),
            portfolio.id
        );

        let securities: HashMap<&str, &AggregatorSecurity> = response
            .securities
            .iter()
            .map(|s| (s.security_id.as_str(), s))
            .collect();

        let drafts = response
            .holdings
            .iter()
            .map(|holding| {
                let security = securities.get(holding.security_id.as_str());
                let name = security
                    .and_then(|s| s.name.clone())
                    .unwrap_or_else(|| "Unknown Security".to_string());
                let category = security
                    .and_then(|s| s.security_type.as_deref())
                    .map(|t| t.to_uppercase())
                    .unwrap_or_else(|| LINKED_DEFAULT_CATEGORY.to_string());
                // institution price, falling back to last close, falling back to 0
                let unit_price = holding
                    .institution_price
                    .or_else(|| security.and_then(|s| s.close_price))
                    .unwrap_or(Decimal::ZERO)
                    .round_dp(DECIMAL_PRECISION);
                let ticker = security.and_then(|s| s.ticker_symbol.clone());

                HoldingDraft::priced(ticker, name, category, holding.quantity, unit_price)
                    .with_cost_basis(holding.cost_basis)
            })
            .collect();

        Ok(drafts)
    }
}
