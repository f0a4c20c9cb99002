use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolios::PortfolioKind;

/// Per-category slice of the user's total value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub category: String,
    pub value: Decimal,
    /// Fraction of the total in [0, 1]; 0 for every slice when the total is 0.
    pub percentage: Decimal,
}

/// Holding annotated with its owning portfolio for the flat cross-portfolio
/// listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub id: String,
    pub portfolio_id: String,
    pub portfolio_name: String,
    pub portfolio_kind: PortfolioKind,
    pub ticker: Option<String>,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub value: Decimal,
    /// Institution name for linked accounts, wallet address for wallets,
    /// "Manual" otherwise.
    pub source: String,
}

/// Result of one daily aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregationOutcome {
    pub users_processed: usize,
    /// (user id, error) pairs for users whose snapshot failed.
    pub failures: Vec<(String, String)>,
}
