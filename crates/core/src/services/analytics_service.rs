use crate::models::analytics::PortfolioSummary;
use crate::models::transaction::Transaction;

/// Derives portfolio metrics from the transaction list.
///
/// Pure and total: no I/O, no error cases. A current price of 0 is read as
/// "price unknown" and still yields a summary.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the full summary in a single pass over `transactions`.
    ///
    /// Order of `transactions` does not matter. Remaining capital is allowed
    /// to go negative.
    pub fn summarize(
        &self,
        transactions: &[Transaction],
        current_price: f64,
        total_capital: f64,
    ) -> PortfolioSummary {
        let (total_btc, total_spent) = transactions
            .iter()
            .fold((0.0_f64, 0_u64), |(btc, idr), t| {
                (btc + t.btc_amount, idr.saturating_add(t.idr_amount))
            });

        let spent = total_spent as f64;
        let average_buy_price = if total_btc > 0.0 { spent / total_btc } else { 0.0 };

        PortfolioSummary {
            total_btc,
            total_spent,
            average_buy_price,
            current_price,
            unrealized_pnl: total_btc * current_price - spent,
            total_capital,
            remaining_capital: total_capital - spent,
            transaction_count: transactions.len(),
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
