use std::sync::Arc;

use log::{debug, info, warn};

use super::linked_model::{NewLinkedAccount, WebhookOutcome};
use crate::cipher::CredentialCipher;
use crate::errors::{Result, ValidationError};
use crate::portfolios::{
    NewPortfolio, Portfolio, PortfolioKind, PortfolioRepositoryTrait, PortfolioStatus,
};
use crate::sync::SyncServiceTrait;
use crate::Error;

const FALLBACK_INSTITUTION_NAME: &str = "Unknown Institution";

/// Manages aggregator-linked brokerage accounts: registration, webhook-driven
/// resyncs, and disconnection. Access tokens are encrypted before they touch
/// the store.
pub struct LinkedAccountService {
    portfolios: Arc<dyn PortfolioRepositoryTrait>,
    cipher: CredentialCipher,
    sync: Arc<dyn SyncServiceTrait>,
}

impl LinkedAccountService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepositoryTrait>,
        cipher: CredentialCipher,
        sync: Arc<dyn SyncServiceTrait>,
    ) -> Self {
        Self {
            portfolios,
            cipher,
            sync,
        }
    }

    /// Registers a linked account as a portfolio and runs its first holdings
    /// sync. Like wallets, a transient first-sync failure leaves the account
    /// registered for the next cycle.
    pub async fn register_linked_account(
        &self,
        user_id: &str,
        account: NewLinkedAccount,
    ) -> Result<Portfolio> {
        if account.access_token.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accessToken".to_string(),
            )));
        }
        if account.item_id.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "itemId".to_string(),
            )));
        }
        if self.portfolios.get_by_item_id(&account.item_id)?.is_some() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "item {} is already linked",
                account.item_id
            ))));
        }

        let encrypted_token = self.cipher.encrypt(&account.access_token)?;
        let name = account
            .institution_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_INSTITUTION_NAME.to_string());

        let new_portfolio = NewPortfolio {
            id: None,
            user_id: user_id.to_string(),
            name: name.clone(),
            kind: PortfolioKind::Linked,
            institution_id: account.institution_id,
            institution_name: Some(name),
            item_id: Some(account.item_id),
            access_token: Some(encrypted_token),
            wallet_address: None,
            network: None,
        };
        new_portfolio.validate()?;
        let portfolio = self.portfolios.create(new_portfolio)?;
        info!(
            "registered linked portfolio {} for {}",
            portfolio.id, user_id
        );

        match self.sync.resync_portfolio(user_id, &portfolio.id, None).await {
            Ok(_) => {}
            Err(e) if e.is_retryable() => {
                warn!(
                    "initial sync of linked portfolio {} failed, will retry on next cycle: {}",
                    portfolio.id, e
                );
            }
            Err(e) => return Err(e),
        }

        Ok(self
            .portfolios
            .get_by_id(&portfolio.id)?
            .unwrap_or(portfolio))
    }

    /// Dispatches an aggregator webhook. Holdings updates trigger a resync of
    /// the affected portfolio; a login-required item is flagged for reauth.
    /// Everything else, including webhooks for items we no longer track, is
    /// acknowledged and ignored.
    pub async fn handle_webhook(
        &self,
        webhook_type: &str,
        webhook_code: &str,
        item_id: &str,
    ) -> Result<WebhookOutcome> {
        let portfolio = match self.portfolios.get_by_item_id(item_id)? {
            Some(p) => p,
            None => {
                warn!("webhook for unknown item {}, ignoring", item_id);
                return Ok(WebhookOutcome::Ignored);
            }
        };

        match (webhook_type, webhook_code) {
            ("HOLDINGS", "DEFAULT_UPDATE") | ("HOLDINGS", "HISTORICAL_UPDATE") => {
                info!(
                    "holdings webhook {} for portfolio {}, resyncing",
                    webhook_code, portfolio.id
                );
                self.sync
                    .resync_portfolio(&portfolio.user_id, &portfolio.id, None)
                    .await?;
                Ok(WebhookOutcome::Processed)
            }
            ("ITEM", "LOGIN_REQUIRED") => {
                info!("item {} requires reauthentication", item_id);
                self.portfolios
                    .set_status(&portfolio.id, PortfolioStatus::NeedsReauth)?;
                Ok(WebhookOutcome::Processed)
            }
            _ => {
                debug!(
                    "unhandled webhook {}/{} for item {}",
                    webhook_type, webhook_code, item_id
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Soft-removes a linked account; history stays, aggregation skips it.
    pub fn disconnect(&self, user_id: &str, portfolio_id: &str) -> Result<()> {
        let portfolio = self
            .portfolios
            .get_for_user(user_id, portfolio_id)?
            .filter(|p| p.kind == PortfolioKind::Linked)
            .ok_or_else(|| Error::NotFound(format!("linked portfolio {} not found", portfolio_id)))?;
        self.portfolios.deactivate(&portfolio.id)?;
        info!("disconnected linked portfolio {}", portfolio.id);
        Ok(())
    }
}
