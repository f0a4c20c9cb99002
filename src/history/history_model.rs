use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::holdings::Holding;
use crate::portfolios::Portfolio;

/// Window applied to the user-level history series. Filters only; the series
/// is never resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    OneYear,
    All,
}

impl HistoryRange {
    pub fn window(&self) -> Option<chrono::Duration> {
        match self {
            HistoryRange::OneDay => Some(chrono::Duration::days(1)),
            HistoryRange::OneWeek => Some(chrono::Duration::days(7)),
            HistoryRange::OneMonth => Some(chrono::Duration::days(30)),
            HistoryRange::ThreeMonths => Some(chrono::Duration::days(90)),
            HistoryRange::OneYear => Some(chrono::Duration::days(365)),
            HistoryRange::All => None,
        }
    }
}

impl std::str::FromStr for HistoryRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1D" => Ok(HistoryRange::OneDay),
            "1W" => Ok(HistoryRange::OneWeek),
            "1M" => Ok(HistoryRange::OneMonth),
            "3M" => Ok(HistoryRange::ThreeMonths),
            "1Y" => Ok(HistoryRange::OneYear),
            "ALL" => Ok(HistoryRange::All),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown history range '{}'",
                other
            ))),
        }
    }
}

/// One point of a value-over-time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDateTime,
    pub value: Decimal,
}

/// Cross-portfolio totals for the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub currency: String,
    /// Absolute change against the user snapshot closest to 24 hours prior;
    /// zero when no such snapshot exists yet.
    pub change_24h: Decimal,
    /// Fractional change relative to that snapshot's total.
    pub change_percent_24h: Decimal,
    pub last_updated: NaiveDateTime,
}

/// Per-portfolio overview row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub total_value: Decimal,
    pub latest_snapshot: Option<HistoryPoint>,
}

/// Single portfolio with composition and recent valuation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDetail {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub total_value: Decimal,
    pub holdings: Vec<Holding>,
    /// Most recent snapshots, re-ordered ascending for charting.
    pub snapshots: Vec<HistoryPoint>,
}
