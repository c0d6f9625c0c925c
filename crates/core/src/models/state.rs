use uuid::Uuid;

use super::alert::AlertConfig;
use super::price::PriceQuote;
use super::settings::Settings;
use super::transaction::Transaction;

/// Everything the application knows at one moment.
///
/// Updates are pure: each `with_*` consumes the state and returns the next
/// one. Persistence happens before an update is applied, never inside it.
/// Derived values (summary, alerts, charts) are not stored here; they are
/// recomputed from this state on every read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Purchases in insertion order
    pub transactions: Vec<Transaction>,

    pub settings: Settings,

    pub alert_config: AlertConfig,

    /// Latest known price; `None` until the first successful fetch
    pub quote: Option<PriceQuote>,
}

impl AppState {
    pub fn new(transactions: Vec<Transaction>, settings: Settings, alert_config: AlertConfig) -> Self {
        Self {
            transactions,
            settings,
            alert_config,
            quote: None,
        }
    }

    /// Current BTC/IDR price, 0 while unknown.
    pub fn current_price(&self) -> f64 {
        self.quote.as_ref().map_or(0.0, |q| q.price)
    }

    pub fn find(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn with_transactions(mut self, transactions: impl IntoIterator<Item = Transaction>) -> Self {
        self.transactions.extend(transactions);
        self
    }

    pub fn without_transaction(mut self, id: Uuid) -> Self {
        self.transactions.retain(|t| t.id != id);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_alert_config(mut self, alert_config: AlertConfig) -> Self {
        self.alert_config = alert_config;
        self
    }

    /// Replace the price. Last write wins.
    pub fn with_quote(mut self, quote: PriceQuote) -> Self {
        self.quote = Some(quote);
        self
    }
}
