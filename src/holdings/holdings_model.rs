use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DECIMAL_PRECISION;

/// One asset position belonging to a portfolio at a point in time.
///
/// Holdings are a snapshot of composition, not persistent entities: every
/// resync replaces a portfolio's holdings wholesale. The single holding of a
/// manual portfolio is the one identity-preserving exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub portfolio_id: String,
    pub ticker: Option<String>,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub value: Decimal,
    pub cost_basis: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

/// Normalized holding emitted by a source adapter, before the store assigns
/// an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDraft {
    pub ticker: Option<String>,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub value: Decimal,
    pub cost_basis: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

impl HoldingDraft {
    /// Draft priced per unit; `value` derived as quantity * price.
    pub fn priced(
        ticker: Option<String>,
        name: String,
        category: String,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            ticker,
            name,
            category,
            quantity,
            unit_price,
            value: (quantity * unit_price).round_dp(DECIMAL_PRECISION),
            cost_basis: None,
            currency: None,
            notes: None,
        }
    }

    pub fn with_cost_basis(mut self, cost_basis: Option<Decimal>) -> Self {
        self.cost_basis = cost_basis;
        self
    }

    pub fn into_holding(self, portfolio_id: &str) -> Holding {
        Holding {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            ticker: self.ticker,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit_price: self.unit_price,
            value: self.value,
            cost_basis: self.cost_basis,
            currency: self.currency,
            notes: self.notes,
        }
    }
}

impl From<&Holding> for HoldingDraft {
    fn from(holding: &Holding) -> Self {
        Self {
            ticker: holding.ticker.clone(),
            name: holding.name.clone(),
            category: holding.category.clone(),
            quantity: holding.quantity,
            unit_price: holding.unit_price,
            value: holding.value,
            cost_basis: holding.cost_basis,
            currency: holding.currency.clone(),
            notes: holding.notes.clone(),
        }
    }
}
