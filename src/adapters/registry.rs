use std::sync::Arc;

use super::source_adapter::SyncSource;
use crate::errors::ValidationError;
use crate::portfolios::PortfolioKind;
use crate::{Error, Result};

/// Resolves the sync source matching a portfolio's kind.
///
/// Manual portfolios are not pollable; their updates come in through the
/// manual-asset operations.
pub struct AdapterRegistry {
    linked: Arc<dyn SyncSource>,
    wallet: Arc<dyn SyncSource>,
}

impl AdapterRegistry {
    pub fn new(linked: Arc<dyn SyncSource>, wallet: Arc<dyn SyncSource>) -> Self {
        Self { linked, wallet }
    }

    pub fn resolve(&self, kind: PortfolioKind) -> Result<Arc<dyn SyncSource>> {
        match kind {
            PortfolioKind::Linked => Ok(self.linked.clone()),
            PortfolioKind::Wallet => Ok(self.wallet.clone()),
            PortfolioKind::Manual => Err(Error::Validation(ValidationError::InvalidInput(
                "manual portfolios cannot be resynced from a source".to_string(),
            ))),
        }
    }
}
