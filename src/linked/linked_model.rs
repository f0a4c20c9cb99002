use serde::{Deserialize, Serialize};

/// Input for registering a linked brokerage account after the aggregator's
/// link flow has exchanged a public token for an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLinkedAccount {
    pub access_token: String,
    pub item_id: String,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
}

/// How an aggregator webhook was handled. Unknown items and unrecognized
/// codes are acknowledged without error so the aggregator does not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookOutcome {
    Processed,
    Ignored,
}
