use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://indodax.com/api";
const PROVIDER: &str = "Indodax";

/// Indodax exchange ticker, used as a fallback for rupiah pairs.
///
/// - **Free**: public endpoint, no API key.
/// - **Endpoint**: `/ticker/{pair}` where pair is e.g. `btcidr`.
///
/// Prices come back as decimal strings: `{"ticker":{"last":"1234567000",...}}`.
pub struct IndodaxProvider {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TickerResponse {
    ticker: Ticker,
}

#[derive(Deserialize)]
struct Ticker {
    last: String,
}

impl IndodaxProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Indodax pair name, e.g. ("BTC", "IDR") → "btcidr".
    pub fn pair(base: &str, quote: &str) -> String {
        format!("{}{}", base.to_lowercase(), quote.to_lowercase())
    }

    /// Parse the `last` price out of a ticker response body.
    pub fn parse_ticker(body: &str) -> Result<f64, CoreError> {
        let resp: TickerResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Malformed ticker response: {e}"),
        })?;
        resp.ticker.last.trim().parse().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid price format '{}': {e}", resp.ticker.last),
        })
    }
}

impl Default for IndodaxProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for IndodaxProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, _base: &str, quote: &str) -> bool {
        quote.eq_ignore_ascii_case("IDR")
    }

    async fn get_current_price(&self, base: &str, quote: &str) -> Result<f64, CoreError> {
        let url = format!("{}/ticker/{}", self.base_url, Self::pair(base, quote));
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse_ticker(&body)
    }
}
