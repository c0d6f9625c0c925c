use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One point of the cumulative portfolio series.
///
/// The core computes the numbers; the presentation layer only renders them.
/// There is one point per transaction, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    /// Date of the transaction that produced this point
    pub date: NaiveDate,

    /// BTC held after this transaction
    pub cumulative_btc: f64,

    /// IDR spent up to and including this transaction
    pub cumulative_spent: u64,

    /// cumulative_btc valued at the current price
    pub current_value: f64,

    /// current_value − cumulative_spent
    pub pnl: f64,
}

/// Price paid in a single purchase next to the current market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPricePoint {
    pub date: NaiveDate,
    pub entry_price: f64,
    pub current_price: f64,
}

/// Split of the current portfolio value into what was invested and the
/// unrealized profit or loss on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalAllocation {
    pub invested: f64,
    pub profit_loss: f64,
}

impl CapitalAllocation {
    pub fn is_profit(&self) -> bool {
        self.profit_loss > 0.0
    }
}
