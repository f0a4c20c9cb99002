use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("aggregator login expired")]
    AuthExpired,
    #[error("aggregator rate limited: {0}")]
    RateLimited(String),
    #[error("aggregator unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for AggregatorError {
    fn from(e: reqwest::Error) -> Self {
        AggregatorError::Unavailable(e.to_string())
    }
}

/// One raw position reported by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorHolding {
    pub security_id: String,
    pub quantity: Decimal,
    pub institution_price: Option<Decimal>,
    pub cost_basis: Option<Decimal>,
}

/// Security metadata the aggregator joins to holdings by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSecurity {
    pub security_id: String,
    pub name: Option<String>,
    pub ticker_symbol: Option<String>,
    #[serde(rename = "type")]
    pub security_type: Option<String>,
    pub close_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorHoldingsResponse {
    pub holdings: Vec<AggregatorHolding>,
    pub securities: Vec<AggregatorSecurity>,
}

/// Exchange a decrypted access credential for the linked account's current
/// positions. `AuthExpired` is signaled distinctly from transient failure.
#[async_trait]
pub trait AggregatorClient: Send + Sync {
    async fn fetch_holdings(
        &self,
        access_token: &str,
    ) -> Result<AggregatorHoldingsResponse, AggregatorError>;
}

/// Default aggregator client, speaking the Plaid investments API.
pub struct PlaidApiClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

#[derive(Serialize)]
struct HoldingsGetRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
}

#[derive(Deserialize)]
struct AggregatorErrorBody {
    error_code: Option<String>,
    error_message: Option<String>,
}

impl PlaidApiClient {
    pub fn new(base_url: String, client_id: String, secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            client_id,
            secret,
        }
    }
}

#[async_trait]
impl AggregatorClient for PlaidApiClient {
    async fn fetch_holdings(
        &self,
        access_token: &str,
    ) -> Result<AggregatorHoldingsResponse, AggregatorError> {
        let url = format!("{}/investments/holdings/get", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&HoldingsGetRequest {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AggregatorError::RateLimited(status.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<AggregatorErrorBody>(&body) {
                let code = error.error_code.unwrap_or_default();
                debug!("aggregator error response: {}", code);
                if code == "ITEM_LOGIN_REQUIRED" {
                    return Err(AggregatorError::AuthExpired);
                }
                if code == "RATE_LIMIT_EXCEEDED" {
                    return Err(AggregatorError::RateLimited(code));
                }
                return Err(AggregatorError::Unavailable(
                    error.error_message.unwrap_or(code),
                ));
            }
            return Err(AggregatorError::Unavailable(format!(
                "aggregator returned {}",
                status
            )));
        }

        response
            .json::<AggregatorHoldingsResponse>()
            .await
            .map_err(|e| AggregatorError::Unavailable(e.to_string()))
    }
}
