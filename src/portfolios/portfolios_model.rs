use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::MANUAL_SOURCE_LABEL;
use crate::errors::ValidationError;
use crate::{Error, Result};

/// Sync source backing a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioKind {
    Linked,
    Wallet,
    Manual,
}

impl std::fmt::Display for PortfolioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioKind::Linked => write!(f, "LINKED"),
            PortfolioKind::Wallet => write!(f, "WALLET"),
            PortfolioKind::Manual => write!(f, "MANUAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioStatus {
    Active,
    NeedsReauth,
    Error,
}

/// Domain model representing one portfolio owned by a user.
///
/// Kind-specific metadata lives in optional fields rather than subtypes; the
/// adapter registry resolves behavior from `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: PortfolioKind,
    pub status: PortfolioStatus,
    pub is_active: bool,

    // LINKED metadata
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub item_id: Option<String>,
    /// Encrypted aggregator access credential. Never serialized out.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    // WALLET metadata
    pub wallet_address: Option<String>,
    pub network: Option<String>,

    pub last_synced_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Portfolio {
    /// Human-readable origin of the portfolio's holdings.
    pub fn source_label(&self) -> String {
        if let Some(name) = &self.institution_name {
            return name.clone();
        }
        if self.kind == PortfolioKind::Wallet {
            if let Some(address) = &self.wallet_address {
                return address.clone();
            }
        }
        MANUAL_SOURCE_LABEL.to_string()
    }
}

/// Input model for creating a new portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub kind: PortfolioKind,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub item_id: Option<String>,
    pub access_token: Option<String>,
    pub wallet_address: Option<String>,
    pub network: Option<String>,
}

impl NewPortfolio {
    pub fn manual(user_id: &str, name: &str) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            name: name.to_string(),
            kind: PortfolioKind::Manual,
            institution_id: None,
            institution_name: None,
            item_id: None,
            access_token: None,
            wallet_address: None,
            network: None,
        }
    }

    /// Validates the new portfolio data
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Portfolio name cannot be empty".to_string(),
            )));
        }
        match self.kind {
            PortfolioKind::Wallet => {
                if self.wallet_address.as_deref().unwrap_or("").trim().is_empty() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "walletAddress".to_string(),
                    )));
                }
            }
            PortfolioKind::Linked => {
                if self.access_token.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "accessToken".to_string(),
                    )));
                }
                if self.item_id.as_deref().unwrap_or("").is_empty() {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "itemId".to_string(),
                    )));
                }
            }
            PortfolioKind::Manual => {}
        }
        Ok(())
    }
}

impl From<NewPortfolio> for Portfolio {
    fn from(new: NewPortfolio) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: new.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: new.user_id,
            name: new.name,
            kind: new.kind,
            status: PortfolioStatus::Active,
            is_active: true,
            institution_id: new.institution_id,
            institution_name: new.institution_name,
            item_id: new.item_id,
            access_token: new.access_token,
            wallet_address: new.wallet_address,
            network: new.network,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
