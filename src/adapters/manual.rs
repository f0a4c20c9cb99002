use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DECIMAL_PRECISION, DEFAULT_CATEGORY};
use crate::errors::ValidationError;
use crate::holdings::HoldingDraft;
use crate::{Error, Result};

/// User-supplied manual asset. Not a polling source: the holding is given
/// directly, so the adapter's role reduces to validation and normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAssetInput {
    pub name: String,
    /// Free-form asset class, e.g. "Real Estate"; upper-cased on normalization.
    pub category: Option<String>,
    pub value: Decimal,
    pub quantity: Option<Decimal>,
    pub ticker: Option<String>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    /// Backdated valuation date for the initial snapshot, if any.
    pub as_of: Option<NaiveDateTime>,
}

/// Validates a manual entry and produces its single holding draft:
/// quantity defaults to 1, unit price is the lump value divided by quantity.
pub fn normalize_manual_input(input: &ManualAssetInput) -> Result<HoldingDraft> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    if input.value <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Asset value must be positive".to_string(),
        )));
    }
    let quantity = input.quantity.unwrap_or(Decimal::ONE);
    if quantity <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Quantity must be positive".to_string(),
        )));
    }

    let category = input
        .category
        .as_deref()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Ok(HoldingDraft {
        ticker: input.ticker.clone(),
        name: input.name.trim().to_string(),
        category,
        quantity,
        unit_price: (input.value / quantity).round_dp(DECIMAL_PRECISION),
        value: input.value,
        cost_basis: None,
        currency: input.currency.clone(),
        notes: input.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(value: Decimal, quantity: Option<Decimal>) -> ManualAssetInput {
        ManualAssetInput {
            name: "Apartment".to_string(),
            category: Some("Real Estate".to_string()),
            value,
            quantity,
            ticker: None,
            currency: None,
            notes: None,
            as_of: None,
        }
    }

    #[test]
    fn lump_sum_defaults_quantity_to_one() {
        let draft = normalize_manual_input(&input(dec!(1000), None)).unwrap();
        assert_eq!(draft.quantity, Decimal::ONE);
        assert_eq!(draft.unit_price, dec!(1000));
        assert_eq!(draft.value, dec!(1000));
        assert_eq!(draft.category, "REAL ESTATE");
    }

    #[test]
    fn explicit_quantity_splits_unit_price() {
        let draft = normalize_manual_input(&input(dec!(300), Some(dec!(4)))).unwrap();
        assert_eq!(draft.unit_price, dec!(75));
        assert_eq!(draft.value, dec!(300));
    }

    #[test]
    fn missing_category_defaults_to_other() {
        let mut i = input(dec!(10), None);
        i.category = None;
        assert_eq!(normalize_manual_input(&i).unwrap().category, "OTHER");
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(normalize_manual_input(&input(dec!(0), None)).is_err());
        assert!(normalize_manual_input(&input(dec!(-5), None)).is_err());
        assert!(normalize_manual_input(&input(dec!(10), Some(dec!(0)))).is_err());
    }
}
