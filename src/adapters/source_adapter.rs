use async_trait::async_trait;
use thiserror::Error;

use crate::holdings::HoldingDraft;
use crate::portfolios::Portfolio;
use crate::providers::AggregatorError;

/// Failure modes a sync source may report. `AuthExpired` is user-actionable
/// and maps to a status change; the other two are transient and leave all
/// state untouched.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source credential expired")]
    AuthExpired,
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source rate limited: {0}")]
    RateLimited(String),
}

impl From<AggregatorError> for SourceError {
    fn from(e: AggregatorError) -> Self {
        match e {
            AggregatorError::AuthExpired => SourceError::AuthExpired,
            AggregatorError::RateLimited(msg) => SourceError::RateLimited(msg),
            AggregatorError::Unavailable(msg) => SourceError::Unavailable(msg),
        }
    }
}

/// Capability contract shared by the pollable portfolio kinds: produce the
/// portfolio's current composition as normalized holding drafts.
///
/// Adapters never retry internally and never mutate the store.
#[async_trait]
pub trait SyncSource: Send + Sync {
    async fn fetch_holdings(&self, portfolio: &Portfolio)
        -> Result<Vec<HoldingDraft>, SourceError>;
}
