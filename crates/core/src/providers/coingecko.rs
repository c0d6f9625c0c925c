use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER: &str = "CoinGecko";

/// CoinGecko provider for spot crypto prices.
///
/// - **Free**: no API key required for the public simple-price endpoint.
/// - **Endpoint**: `/simple/price?ids={id}&vs_currencies={currency}`
///
/// CoinGecko addresses coins by id ("bitcoin"), not ticker, and answers with
/// lowercase currency keys: `{"bitcoin":{"idr":1234567890}}`.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at another host (mirror, proxy, local stub).
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

    /// Map a ticker to a CoinGecko coin id.
    pub fn coin_id(symbol: &str) -> Option<&'static str> {
        match symbol.to_uppercase().as_str() {
            "BTC" => Some("bitcoin"),
            "ETH" => Some("ethereum"),
            "USDT" => Some("tether"),
            _ => None,
        }
    }

    /// Extract `body[coin_id][currency]` from a simple-price response.
    pub fn parse_simple_price(body: &Value, coin_id: &str, currency: &str) -> Result<f64, CoreError> {
        let key = currency.to_lowercase();
        body.get(coin_id)
            .and_then(|coin| coin.get(&key))
            .and_then(Value::as_f64)
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("No {key} price for {coin_id} in response"),
            })
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports(&self, base: &str, _quote: &str) -> bool {
        Self::coin_id(base).is_some()
    }

    async fn get_current_price(&self, base: &str, quote: &str) -> Result<f64, CoreError> {
        let id = Self::coin_id(base).ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Unsupported coin {base}"),
        })?;
        let url = format!(
            "{}/simple/price?ids={id}&vs_currencies={}",
            self.base_url,
            quote.to_lowercase()
        );

        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse response for {base}/{quote}: {e}"),
            })?;

        Self::parse_simple_price(&body, id, quote)
    }
}
