use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EntryError;

/// Sort order for transaction listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSortOrder {
    /// Newest date first (default for display)
    #[default]
    DateDesc,
    /// Oldest date first
    DateAsc,
    /// Largest BTC amount first
    BtcDesc,
    /// Smallest BTC amount first
    BtcAsc,
    /// Largest IDR spend first
    IdrDesc,
    /// Smallest IDR spend first
    IdrAsc,
}

/// Filters and ordering for a transaction listing. Filters combine; an
/// empty query lists everything newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionQuery {
    pub order: TransactionSortOrder,
    /// Case-insensitive text the notes must contain
    pub search: Option<String>,
    /// Inclusive `(from, to)` date range
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl TransactionQuery {
    pub fn sorted(order: TransactionSortOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.range = Some((from, to));
        self
    }
}

/// A single recorded BTC purchase.
///
/// Transactions are immutable once stored; the only lifecycle step after
/// creation is permanent deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// Purchase date (daily granularity)
    pub date: NaiveDate,

    /// BTC received, always positive (8-decimal precision)
    pub btc_amount: f64,

    /// Rupiah spent, always positive (IDR has no subunits here)
    pub idr_amount: u64,

    /// Optional free-text notes (strategy, market conditions, exchange)
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, btc_amount: f64, idr_amount: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            btc_amount,
            idr_amount,
            notes: None,
        }
    }

    /// Create a transaction with notes attached.
    pub fn with_notes(
        date: NaiveDate,
        btc_amount: f64,
        idr_amount: u64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::new(date, btc_amount, idr_amount)
        }
    }

    /// Effective price paid per BTC in this purchase.
    pub fn price_per_btc(&self) -> f64 {
        if self.btc_amount > 0.0 {
            self.idr_amount as f64 / self.btc_amount
        } else {
            0.0
        }
    }
}

/// A purchase as submitted by the user, before validation.
///
/// Amounts are kept as `f64` so that zero, negative, fractional and
/// non-finite inputs can be reported instead of silently coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub btc_amount: f64,
    pub idr_amount: f64,
    pub notes: Option<String>,
}

impl TransactionDraft {
    pub fn new(date: NaiveDate, btc_amount: f64, idr_amount: f64) -> Self {
        Self {
            date,
            btc_amount,
            idr_amount,
            notes: None,
        }
    }

    /// Attach notes. Blank notes are dropped.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        };
        self
    }

    /// Build a draft from raw form text.
    ///
    /// Fails only when an amount is not a finite number; range checks happen
    /// in entry validation.
    pub fn parse(
        date: NaiveDate,
        btc_amount: &str,
        idr_amount: &str,
        notes: Option<&str>,
    ) -> Result<Self, EntryError> {
        let btc = parse_amount("BTC amount", btc_amount)?;
        let idr = parse_amount("IDR amount", idr_amount)?;
        let draft = Self::new(date, btc, idr);
        Ok(match notes {
            Some(n) => draft.notes(n),
            None => draft,
        })
    }
}

fn parse_amount(field: &'static str, input: &str) -> Result<f64, EntryError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(EntryError::NotANumber {
            field,
            input: trimmed.to_string(),
        }),
    }
}
