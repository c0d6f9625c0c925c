use crate::errors::CoreError;
use crate::models::price::PriceQuote;
use crate::providers::registry::PriceProviderRegistry;

/// Fetches spot prices from the registered providers with fallback.
///
/// No caching: the feed polls on a fixed interval and only the latest
/// price matters.
pub struct PriceService {
    registry: PriceProviderRegistry,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider can quote the pair.
    pub fn has_provider_for(&self, base: &str, quote: &str) -> bool {
        !self.registry.get_providers_for(base, quote).is_empty()
    }

    /// Names of the providers that can quote the pair, in priority order.
    pub fn get_provider_names(&self, base: &str, quote: &str) -> Vec<String> {
        self.registry
            .get_providers_for(base, quote)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Fetch the current price of `base` in `quote`.
    ///
    /// Tries providers in registration order and falls back to the next one
    /// when a provider fails or returns a price that is not finite and
    /// positive. Returns the last error if every provider fails.
    pub async fn fetch_quote(&self, base: &str, quote: &str) -> Result<PriceQuote, CoreError> {
        let providers = self.registry.get_providers_for(base, quote);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(format!("{base}/{quote}")));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.get_current_price(base, quote).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    return Ok(PriceQuote::new(price, provider.name()));
                }
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {base}/{quote}: {price} (must be finite and positive)"
                        ),
                    });
                }
                Err(e) => {
                    tracing::debug!(provider = provider.name(), error = %e, "price provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(format!("{base}/{quote}"))))
    }
}
