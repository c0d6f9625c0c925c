use async_trait::async_trait;

use crate::errors::CoreError;

/// Abstraction over a source of spot prices.
///
/// Each API (CoinGecko, Indodax) implements this trait. If an API changes or
/// goes away only its implementation is touched; the registry and the price
/// feed work against the trait.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs and quotes).
    fn name(&self) -> &str;

    /// Whether this provider can quote `base` in `quote` (e.g. BTC in IDR).
    fn supports(&self, base: &str, quote: &str) -> bool;

    /// Current price of one unit of `base`, denominated in `quote`.
    async fn get_current_price(&self, base: &str, quote: &str) -> Result<f64, CoreError>;
}
