use serde::{Deserialize, Serialize};

/// Derived portfolio metrics. Never persisted; recomputed from the current
/// transaction set and price every time it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of BTC across all purchases
    pub total_btc: f64,

    /// Sum of IDR spent across all purchases
    pub total_spent: u64,

    /// total_spent / total_btc, or 0 when nothing has been bought
    pub average_buy_price: f64,

    /// Latest BTC/IDR price; 0 means the price is not known yet
    pub current_price: f64,

    /// total_btc × current_price − total_spent
    pub unrealized_pnl: f64,

    /// Capital the user has set aside for buying
    pub total_capital: f64,

    /// total_capital − total_spent (negative when overspent)
    pub remaining_capital: f64,

    /// Number of purchases the summary was derived from
    pub transaction_count: usize,
}

impl PortfolioSummary {
    /// Market value of the holdings at the current price.
    pub fn current_value(&self) -> f64 {
        self.total_btc * self.current_price
    }

    /// Unrealized P&L as a percentage of what was spent.
    pub fn profit_pct(&self) -> f64 {
        if self.total_spent > 0 {
            self.unrealized_pnl / self.total_spent as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn is_profit(&self) -> bool {
        self.unrealized_pnl >= 0.0
    }

    /// Whether a live price has been applied.
    pub fn has_price(&self) -> bool {
        self.current_price > 0.0
    }
}
