use super::coingecko::CoinGeckoProvider;
use super::indodax::IndodaxProvider;
use super::traits::PriceProvider;

/// Ordered set of price providers.
///
/// Lookups return providers in registration order; the first one is the
/// primary source and the rest are fallbacks.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// CoinGecko first, Indodax as fallback. Neither needs an API key.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CoinGeckoProvider::new()));
        registry.register(Box::new(IndodaxProvider::new()));
        registry
    }

    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// All providers able to quote `base` in `quote`, in priority order.
    pub fn get_providers_for(&self, base: &str, quote: &str) -> Vec<&dyn PriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supports(base, quote))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
