use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Terminal state of one resync attempt. A reauth requirement is an expected,
/// user-actionable condition, so it is reported as a degraded outcome rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SyncOutcome {
    Completed { total_value: Decimal },
    ReauthRequired,
}

/// Trait defining the contract for the sync orchestrator.
#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Re-fetches one portfolio's composition from its source and replaces
    /// the stored holdings. `as_of` backdates the resulting snapshot (manual
    /// entries only pass this through the manual operations).
    async fn resync_portfolio(
        &self,
        user_id: &str,
        portfolio_id: &str,
        as_of: Option<NaiveDateTime>,
    ) -> Result<SyncOutcome>;
}
