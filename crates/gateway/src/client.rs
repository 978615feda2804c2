use std::time::Duration;

use async_trait::async_trait;
use railrefund_core::config::GatewayConfig;
use railrefund_core::PnrNumber;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::PnrGateway;

const PNR_STATUS_PATH: &str = "/api/v3/getPNRStatus";

/// RapidAPI-hosted IRCTC PNR status provider.
pub struct RapidApiGateway {
    client: Client,
    endpoint: String,
    api_host: String,
    api_key: SecretString,
    timeout_secs: u64,
    max_retries: u32,
}

impl RapidApiGateway {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key_value().ok_or(GatewayError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| GatewayError::Client(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{PNR_STATUS_PATH}", config.base_url.trim_end_matches('/')),
            api_host: config.api_host.clone(),
            api_key: SecretString::from(api_key.to_string()),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries.min(1),
        })
    }

    async fn send_once(&self, pnr: &PnrNumber) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("pnrNumber", pnr.as_str())])
            .header("x-rapidapi-key", self.api_key.expose_secret())
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await
            .map_err(|error| self.classify(error))?;

        let status = response.status();
        if status != StatusCode::OK {
            if status.is_client_error() {
                if let Some(message) = refusal_message(response).await {
                    return Err(GatewayError::Refused { status: status.as_u16(), message });
                }
            }
            return Err(GatewayError::Status { status: status.as_u16() });
        }

        response.json::<Value>().await.map_err(|error| {
            if error.is_timeout() {
                GatewayError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                GatewayError::Decode(error.to_string())
            }
        })
    }

    fn classify(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout { timeout_secs: self.timeout_secs }
        } else {
            GatewayError::Transport(error.to_string())
        }
    }
}

/// `message` field of a JSON error body, when the provider sent one.
async fn refusal_message(response: reqwest::Response) -> Option<String> {
    let body = response.json::<Value>().await.ok()?;
    let message = body.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[async_trait]
impl PnrGateway for RapidApiGateway {
    async fn fetch_raw(&self, pnr: &PnrNumber) -> Result<Value, GatewayError> {
        let mut attempt = 0;
        loop {
            match self.send_once(pnr).await {
                Ok(payload) => {
                    debug!(
                        event_name = "gateway.pnr.fetched",
                        pnr = %pnr,
                        attempt,
                        "pnr status fetched from upstream"
                    );
                    return Ok(payload);
                }
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "gateway.pnr.retry",
                        pnr = %pnr,
                        attempt,
                        error = %error,
                        "retrying pnr status lookup"
                    );
                }
                Err(error) => {
                    warn!(
                        event_name = "gateway.pnr.failed",
                        pnr = %pnr,
                        attempt,
                        error = %error,
                        "pnr status lookup failed"
                    );
                    return Err(error);
                }
            }
        }
    }
}
