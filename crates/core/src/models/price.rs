use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A BTC/IDR price obtained from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price of one BTC in IDR
    pub price: f64,

    /// When the quote was fetched
    pub fetched_at: DateTime<Utc>,

    /// Name of the provider that answered
    pub source: String,
}

impl PriceQuote {
    pub fn new(price: f64, source: impl Into<String>) -> Self {
        Self {
            price,
            fetched_at: Utc::now(),
            source: source.into(),
        }
    }
}

/// What the price feed currently knows.
///
/// `quote` is the last successful fetch and survives failed polls.
/// `last_error` is a transient notification: set when a poll fails and
/// cleared by the next successful one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub quote: Option<PriceQuote>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl FeedSnapshot {
    /// Current price, or 0 while no price is known.
    pub fn price(&self) -> f64 {
        self.quote.as_ref().map_or(0.0, |q| q.price)
    }
}
