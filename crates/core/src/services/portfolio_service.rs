use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{CoreError, EntryError};
use crate::models::transaction::{
    Transaction, TransactionDraft, TransactionQuery, TransactionSortOrder,
};

/// Entry validation, capital parsing, form calculations and list queries.
///
/// Pure business logic, no I/O or API calls.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a submitted purchase against the capital still available.
    ///
    /// Rules:
    /// - both amounts must be finite and greater than zero
    /// - IDR must be whole rupiah and fit in a `u64`
    /// - IDR must not exceed `remaining_capital`
    ///
    /// On success the purchase gets a fresh id. Nothing is persisted here.
    pub fn validate_entry(
        &self,
        draft: TransactionDraft,
        remaining_capital: f64,
    ) -> Result<Transaction, EntryError> {
        if !draft.btc_amount.is_finite() {
            return Err(EntryError::NotANumber {
                field: "BTC amount",
                input: draft.btc_amount.to_string(),
            });
        }
        if !draft.idr_amount.is_finite() {
            return Err(EntryError::NotANumber {
                field: "IDR amount",
                input: draft.idr_amount.to_string(),
            });
        }
        if draft.btc_amount <= 0.0 {
            return Err(EntryError::NonPositiveBtc);
        }
        if draft.idr_amount <= 0.0 {
            return Err(EntryError::NonPositiveIdr);
        }
        if draft.idr_amount >= u64::MAX as f64 {
            return Err(EntryError::IdrOutOfRange(draft.idr_amount));
        }
        if draft.idr_amount.fract() != 0.0 {
            return Err(EntryError::FractionalIdr(draft.idr_amount));
        }
        if draft.idr_amount > remaining_capital {
            return Err(EntryError::InsufficientCapital {
                requested: draft.idr_amount as u64,
                remaining: remaining_capital,
            });
        }

        Ok(Transaction {
            id: Uuid::new_v4(),
            date: draft.date,
            btc_amount: draft.btc_amount,
            idr_amount: draft.idr_amount as u64,
            notes: draft.notes,
        })
    }

    /// Parse a capital amount typed by the user.
    pub fn parse_capital(&self, input: &str) -> Result<f64, CoreError> {
        let trimmed = input.trim();
        let value: f64 = trimmed.parse().map_err(|_| {
            CoreError::Validation(format!("Capital must be a number, got '{trimmed}'"))
        })?;
        self.check_capital(value)?;
        Ok(value)
    }

    pub fn check_capital(&self, value: f64) -> Result<(), CoreError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "Capital must be a non-negative number, got {value}"
            )));
        }
        Ok(())
    }

    /// How much BTC `idr` buys at `price`, rounded to 8 decimals.
    /// `None` while the price is unknown.
    pub fn idr_to_btc(&self, idr: f64, price: f64) -> Option<f64> {
        if price > 0.0 && idr.is_finite() {
            Some((idr / price * 1e8).round() / 1e8)
        } else {
            None
        }
    }

    /// What `btc` costs at `price`, in whole rupiah.
    /// `None` while the price is unknown.
    pub fn btc_to_idr(&self, btc: f64, price: f64) -> Option<f64> {
        if price > 0.0 && btc.is_finite() {
            Some((btc * price).round())
        } else {
            None
        }
    }

    /// Transactions in the requested order. Sorting is stable, so purchases
    /// on the same day keep their insertion order.
    pub fn get_sorted<'a>(
        &self,
        transactions: &'a [Transaction],
        order: TransactionSortOrder,
    ) -> Vec<&'a Transaction> {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sort_refs(&mut sorted, order);
        sorted
    }

    /// Apply the range filter, then the notes search, then the ordering.
    pub fn query<'a>(
        &self,
        transactions: &'a [Transaction],
        query: &TransactionQuery,
    ) -> Vec<&'a Transaction> {
        let needle = query.search.as_ref().map(|q| q.to_lowercase());
        let mut found: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| {
                query
                    .range
                    .is_none_or(|(from, to)| t.date >= from && t.date <= to)
            })
            .filter(|t| needle.as_deref().is_none_or(|q| notes_contain(t, q)))
            .collect();
        sort_refs(&mut found, query.order);
        found
    }

    /// Case-insensitive substring match against notes.
    pub fn search<'a>(&self, transactions: &'a [Transaction], query: &str) -> Vec<&'a Transaction> {
        let q = query.to_lowercase();
        transactions.iter().filter(|t| notes_contain(t, &q)).collect()
    }

    /// Transactions dated within `from..=to`, newest first.
    pub fn in_range<'a>(
        &self,
        transactions: &'a [Transaction],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<&'a Transaction> {
        let mut found: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        found
    }
}

fn notes_contain(transaction: &Transaction, lowercase_query: &str) -> bool {
    transaction
        .notes
        .as_deref()
        .is_some_and(|n| n.to_lowercase().contains(lowercase_query))
}

fn sort_refs(transactions: &mut [&Transaction], order: TransactionSortOrder) {
    match order {
        TransactionSortOrder::DateDesc => transactions.sort_by(|a, b| b.date.cmp(&a.date)),
        TransactionSortOrder::DateAsc => transactions.sort_by(|a, b| a.date.cmp(&b.date)),
        TransactionSortOrder::BtcDesc => {
            transactions.sort_by(|a, b| b.btc_amount.total_cmp(&a.btc_amount))
        }
        TransactionSortOrder::BtcAsc => {
            transactions.sort_by(|a, b| a.btc_amount.total_cmp(&b.btc_amount))
        }
        TransactionSortOrder::IdrDesc => {
            transactions.sort_by(|a, b| b.idr_amount.cmp(&a.idr_amount))
        }
        TransactionSortOrder::IdrAsc => {
            transactions.sort_by(|a, b| a.idr_amount.cmp(&b.idr_amount))
        }
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
