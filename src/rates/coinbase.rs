use std::time::Duration;

use serde_json::Value as JsonValue;

use super::{parse_rate_response, RateProvider};
use crate::config::ExchangeSettings;
use crate::error::RateError;

const USER_AGENT: &str = concat!("permcalc/", env!("CARGO_PKG_VERSION"));

/// client for the public `/v2/exchange-rates` endpoint
pub struct CoinbaseClient {
    client: reqwest::blocking::Client,
    api_base_url: String,
}

impl CoinbaseClient {
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self, RateError> {
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|source| RateError::Network {
                url: api_base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            api_base_url,
        })
    }

    pub fn from_settings(settings: &ExchangeSettings) -> Result<Self, RateError> {
        Self::new(
            &settings.api_url,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn rates_url(&self, from: &str) -> String {
        format!(
            "{}/v2/exchange-rates?currency={}",
            self.api_base_url,
            urlencoding::encode(from)
        )
    }
}

impl RateProvider for CoinbaseClient {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let url = self.rates_url(from);
        tracing::debug!(%url, "requesting exchange rates");

        let network = |source| RateError::Network {
            url: url.clone(),
            source,
        };

        let response = self.client.get(&url).send().map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: JsonValue = response
            .json()
            .map_err(|e| RateError::Malformed(e.to_string()))?;

        parse_rate_response(&body, from, to)
    }
}
