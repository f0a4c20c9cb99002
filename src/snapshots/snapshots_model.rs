use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Append-only total-value record for one portfolio; one per sync or manual
/// update event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: String,
    pub portfolio_id: String,
    pub date: NaiveDateTime,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioSnapshot {
    pub portfolio_id: String,
    pub date: NaiveDateTime,
    pub total_value: Decimal,
}

impl From<NewPortfolioSnapshot> for PortfolioSnapshot {
    fn from(new: NewPortfolioSnapshot) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: new.portfolio_id,
            date: new.date,
            total_value: new.total_value,
        }
    }
}

/// Cross-portfolio total for one user; the derived read model behind the
/// history chart. Written only by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPortfolioSnapshot {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDateTime,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserPortfolioSnapshot {
    pub user_id: String,
    pub date: NaiveDateTime,
    pub total_value: Decimal,
}

impl From<NewUserPortfolioSnapshot> for UserPortfolioSnapshot {
    fn from(new: NewUserPortfolioSnapshot) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id,
            date: new.date,
            total_value: new.total_value,
        }
    }
}
