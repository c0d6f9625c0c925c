use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "date,btc_amount,idr_amount,price_per_btc,notes";

/// Converts the transaction list to and from exchange formats.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// One CSV row: date, BTC with 8 decimals, IDR, whole-rupiah price per
    /// BTC, and the notes (always quoted, inner quotes doubled).
    pub fn csv_row(&self, transaction: &Transaction) -> String {
        let notes = transaction.notes.as_deref().unwrap_or("");
        format!(
            "{},{:.8},{},{:.0},\"{}\"",
            transaction.date,
            transaction.btc_amount,
            transaction.idr_amount,
            transaction.price_per_btc(),
            notes.replace('"', "\"\""),
        )
    }

    /// Full CSV document: header, then one row per transaction in
    /// chronological order, joined with `\n`.
    pub fn to_csv(&self, transactions: &[Transaction]) -> String {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by_key(|t| t.date);

        std::iter::once(CSV_HEADER.to_string())
            .chain(sorted.into_iter().map(|t| self.csv_row(t)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Download name for an export made on `today`.
    pub fn csv_file_name(&self, today: NaiveDate) -> String {
        format!("btc-transactions-{}.csv", today.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON array of all transactions.
    pub fn to_json(&self, transactions: &[Transaction]) -> Result<String, CoreError> {
        serde_json::to_string_pretty(transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions to JSON: {e}"))
        })
    }

    /// Parse a JSON array of transactions, rejecting records whose amounts
    /// are not positive.
    pub fn from_json(&self, json: &str) -> Result<Vec<Transaction>, CoreError> {
        let transactions: Vec<Transaction> = serde_json::from_str(json)?;
        for t in &transactions {
            if !(t.btc_amount.is_finite() && t.btc_amount > 0.0) || t.idr_amount == 0 {
                return Err(CoreError::Validation(format!(
                    "Imported transaction {} has non-positive amounts",
                    t.id
                )));
            }
        }
        Ok(transactions)
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}
