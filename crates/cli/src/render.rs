//! Plain-text views for the terminal.

use std::fmt::Write;

use btc_tracker_core::format::{format_btc, format_idr, format_pct};
use btc_tracker_core::models::{alert::Alert, analytics::PortfolioSummary, transaction::Transaction};

/// The summary cards as aligned label/value lines.
pub fn summary(summary: &PortfolioSummary) -> String {
    let price = if summary.has_price() {
        format_idr(summary.current_price)
    } else {
        "unavailable".to_string()
    };
    let pnl = format!(
        "{} ({})",
        format_idr(summary.unrealized_pnl),
        format_pct(summary.profit_pct())
    );

    let rows = [
        ("BTC price", price),
        ("Total BTC", format_btc(summary.total_btc)),
        ("Total spent", format_idr(summary.total_spent as f64)),
        ("Average buy price", format_idr(summary.average_buy_price)),
        ("Current value", format_idr(summary.current_value())),
        ("Unrealized P&L", pnl),
        ("Total capital", format_idr(summary.total_capital)),
        ("Remaining capital", format_idr(summary.remaining_capital)),
        ("Transactions", summary.transaction_count.to_string()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<18} {value}");
    }
    out
}

pub fn alerts(alerts: &[Alert]) -> String {
    alerts.iter().map(|a| format!("! {a}\n")).collect()
}

/// One line per transaction: date, BTC, IDR, price paid, notes, id.
pub fn transactions(list: &[&Transaction]) -> String {
    if list.is_empty() {
        return "No transactions yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>13}  {:>16}  {:>18}  {:<24}  ID",
        "DATE", "BTC", "IDR", "PRICE/BTC", "NOTES"
    );
    for t in list {
        let _ = writeln!(
            out,
            "{:<10}  {:>13}  {:>16}  {:>18}  {:<24}  {}",
            t.date,
            format_btc(t.btc_amount),
            format_idr(t.idr_amount as f64),
            format_idr(t.price_per_btc()),
            truncate(t.notes.as_deref().unwrap_or(""), 24),
            t.id
        );
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn summary_without_price_says_unavailable() {
        let s = PortfolioSummary {
            total_btc: 0.0,
            total_spent: 0,
            average_buy_price: 0.0,
            current_price: 0.0,
            unrealized_pnl: 0.0,
            total_capital: 100_000_000.0,
            remaining_capital: 100_000_000.0,
            transaction_count: 0,
        };
        let text = summary(&s);
        assert!(text.contains("unavailable"));
        assert!(text.contains("Rp 100.000.000"));
    }

    #[test]
    fn transaction_rows_show_price_paid() {
        let t = Transaction::with_notes(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            0.005,
            5_000_000,
            "first stack",
        );
        let text = transactions(&[&t]);
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("Rp 1.000.000.000"));
        assert!(text.contains("first stack"));
    }

    #[test]
    fn long_notes_are_cut() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
