use crate::models::chart::{CapitalAllocation, ChartDataPoint, EntryPricePoint};
use crate::models::transaction::Transaction;

/// Generates chart-ready series from the transaction list.
///
/// Every series is derived fresh on each call from the transactions and the
/// current price; nothing is maintained incrementally.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Cumulative portfolio series: one point per transaction, oldest first.
    ///
    /// Transactions are sorted by date (stable, so same-day purchases keep
    /// insertion order) and folded into running totals. Valuation and P&L
    /// use `current_price` for every point.
    pub fn portfolio_series(
        &self,
        transactions: &[Transaction],
        current_price: f64,
    ) -> Vec<ChartDataPoint> {
        let mut cumulative_btc = 0.0;
        let mut cumulative_spent: u64 = 0;

        chronological(transactions)
            .into_iter()
            .map(|t| {
                cumulative_btc += t.btc_amount;
                cumulative_spent = cumulative_spent.saturating_add(t.idr_amount);
                let current_value = cumulative_btc * current_price;
                ChartDataPoint {
                    date: t.date,
                    cumulative_btc,
                    cumulative_spent,
                    current_value,
                    pnl: current_value - cumulative_spent as f64,
                }
            })
            .collect()
    }

    /// Price paid per BTC in each purchase, oldest first, next to the
    /// current price.
    pub fn entry_price_series(
        &self,
        transactions: &[Transaction],
        current_price: f64,
    ) -> Vec<EntryPricePoint> {
        chronological(transactions)
            .into_iter()
            .map(|t| EntryPricePoint {
                date: t.date,
                entry_price: t.price_per_btc(),
                current_price,
            })
            .collect()
    }

    /// Invested amount versus unrealized profit/loss at the current price.
    pub fn capital_allocation(
        &self,
        transactions: &[Transaction],
        current_price: f64,
    ) -> CapitalAllocation {
        let invested: f64 = transactions.iter().map(|t| t.idr_amount as f64).sum();
        let total_btc: f64 = transactions.iter().map(|t| t.btc_amount).sum();
        CapitalAllocation {
            invested,
            profit_loss: total_btc * current_price - invested,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.date);
    sorted
}
