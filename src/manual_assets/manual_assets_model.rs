use serde::{Deserialize, Serialize};

use crate::holdings::Holding;
use crate::portfolios::Portfolio;

/// A manual asset is modeled as a portfolio with exactly one holding, so it
/// participates in snapshots and history like every other source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAsset {
    pub portfolio: Portfolio,
    pub holding: Holding,
}
