pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use uuid::Uuid;

use errors::CoreError;
use models::{
    alert::{Alert, AlertConfig},
    analytics::PortfolioSummary,
    chart::{CapitalAllocation, ChartDataPoint, EntryPricePoint},
    price::{FeedSnapshot, PriceQuote},
    settings::Settings,
    state::AppState,
    transaction::{Transaction, TransactionDraft, TransactionQuery, TransactionSortOrder},
};
use services::{
    alert_service::AlertService, analytics_service::AnalyticsService,
    chart_service::ChartService, export_service::ExportService,
    portfolio_service::PortfolioService, price_service::PriceService,
};
use storage::{preferences::PreferenceStore, repository::PortfolioRepository};

/// Main entry point for the BTC tracker core library.
///
/// Owns the application state plus the persistence backends, and routes
/// every command through them. Writes go to the backend first; the state is
/// only replaced once the backend reports success.
#[must_use]
pub struct BtcTracker {
    state: AppState,
    repository: Box<dyn PortfolioRepository>,
    preferences: Box<dyn PreferenceStore>,
    portfolio_service: PortfolioService,
    analytics_service: AnalyticsService,
    alert_service: AlertService,
    chart_service: ChartService,
    export_service: ExportService,
}

impl std::fmt::Debug for BtcTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BtcTracker")
            .field("transactions", &self.state.transactions.len())
            .field("settings", &self.state.settings)
            .field("quote", &self.state.quote)
            .finish()
    }
}

impl BtcTracker {
    /// Load transactions, settings and alert preferences from the backends.
    /// Missing settings or preferences fall back to defaults, and so do
    /// stored alert settings that fail validation.
    pub async fn open(
        repository: Box<dyn PortfolioRepository>,
        preferences: Box<dyn PreferenceStore>,
    ) -> Result<Self, CoreError> {
        let transactions = repository.list_transactions().await?;
        let settings = repository.load_settings().await?.unwrap_or_default();
        let alert_service = AlertService::new();
        let mut alert_config = preferences.load_alert_config()?;
        if let Err(e) = alert_service.validate_config(&alert_config) {
            tracing::warn!(error = %e, "stored alert settings are invalid, using defaults");
            alert_config = AlertConfig::default();
        }
        tracing::debug!(
            transactions = transactions.len(),
            total_capital = settings.total_capital,
            "tracker opened"
        );

        Ok(Self {
            state: AppState::new(transactions, settings, alert_config),
            repository,
            preferences,
            portfolio_service: PortfolioService::new(),
            analytics_service: AnalyticsService::new(),
            alert_service,
            chart_service: ChartService::new(),
            export_service: ExportService::new(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validate a purchase against the remaining capital, persist it, then
    /// add it to the state. Returns the stored transaction.
    pub async fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction, CoreError> {
        let remaining = self.summary().remaining_capital;
        let transaction = self.portfolio_service.validate_entry(draft, remaining)?;

        self.repository.create_transaction(&transaction).await?;
        tracing::info!(
            id = %transaction.id,
            btc = transaction.btc_amount,
            idr = transaction.idr_amount,
            "transaction added"
        );

        self.replace_state(|s| s.with_transaction(transaction.clone()));
        Ok(transaction)
    }

    /// Same as [`BtcTracker::add_transaction`] but starting from raw form text.
    pub async fn add_transaction_from_input(
        &mut self,
        date: NaiveDate,
        btc_input: &str,
        idr_input: &str,
        notes: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let draft = TransactionDraft::parse(date, btc_input, idr_input, notes)?;
        self.add_transaction(draft).await
    }

    /// Permanently delete a transaction.
    pub async fn delete_transaction(&mut self, id: Uuid) -> Result<(), CoreError> {
        if self.state.find(id).is_none() {
            return Err(CoreError::TransactionNotFound(id.to_string()));
        }
        self.repository.delete_transaction(id).await?;
        tracing::info!(%id, "transaction deleted");
        self.replace_state(|s| s.without_transaction(id));
        Ok(())
    }

    #[must_use]
    pub fn get_transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.state.find(id)
    }

    /// Transactions newest first.
    #[must_use]
    pub fn transactions(&self) -> Vec<&Transaction> {
        self.transactions_sorted(TransactionSortOrder::default())
    }

    #[must_use]
    pub fn transactions_sorted(&self, order: TransactionSortOrder) -> Vec<&Transaction> {
        self.portfolio_service.get_sorted(&self.state.transactions, order)
    }

    /// Case-insensitive search over notes.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Transaction> {
        self.portfolio_service.search(&self.state.transactions, query)
    }

    /// Transactions within `from..=to`, newest first.
    #[must_use]
    pub fn transactions_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&Transaction> {
        self.portfolio_service.in_range(&self.state.transactions, from, to)
    }

    /// Transactions matching every filter in `query`, in its order.
    #[must_use]
    pub fn query_transactions(&self, query: &TransactionQuery) -> Vec<&Transaction> {
        self.portfolio_service.query(&self.state.transactions, query)
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.state.transactions.len()
    }

    // ── Capital ─────────────────────────────────────────────────────

    pub async fn set_total_capital(&mut self, total_capital: f64) -> Result<(), CoreError> {
        self.portfolio_service.check_capital(total_capital)?;
        let settings = Settings { total_capital };
        self.repository.upsert_settings(&settings).await?;
        tracing::info!(total_capital, "capital updated");
        self.replace_state(|s| s.with_settings(settings));
        Ok(())
    }

    /// Parse user text, then behave like [`BtcTracker::set_total_capital`].
    pub async fn set_total_capital_str(&mut self, input: &str) -> Result<(), CoreError> {
        let value = self.portfolio_service.parse_capital(input)?;
        self.set_total_capital(value).await
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    // ── Alerts ──────────────────────────────────────────────────────

    #[must_use]
    pub fn alert_config(&self) -> &AlertConfig {
        &self.state.alert_config
    }

    pub fn set_alert_config(&mut self, config: AlertConfig) -> Result<(), CoreError> {
        self.alert_service.validate_config(&config)?;
        self.preferences.save_alert_config(&config)?;
        tracing::info!(
            threshold_pct = config.low_capital_threshold_pct,
            target_price = config.target_price,
            direction = %config.direction,
            "alert settings saved"
        );
        self.replace_state(|s| s.with_alert_config(config));
        Ok(())
    }

    /// Alerts active for the current state. Recomputed on every call.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        let summary = self.summary();
        self.alert_service.evaluate(
            summary.remaining_capital,
            summary.total_capital,
            summary.current_price,
            &self.state.alert_config,
        )
    }

    // ── Prices ──────────────────────────────────────────────────────

    pub fn apply_quote(&mut self, quote: PriceQuote) {
        self.replace_state(|s| s.with_quote(quote));
    }

    /// Take the latest quote from a feed snapshot. A snapshot without a quote
    /// leaves the last known price in place.
    pub fn apply_snapshot(&mut self, snapshot: &FeedSnapshot) {
        if let Some(quote) = snapshot.quote.clone() {
            self.apply_quote(quote);
        }
    }

    /// Fetch a BTC/IDR quote once and apply it. On failure the previous
    /// price is kept and the error returned.
    pub async fn refresh_price(&mut self, price_service: &PriceService) -> Result<f64, CoreError> {
        let quote = price_service.fetch_quote("BTC", "IDR").await?;
        let price = quote.price;
        self.apply_quote(quote);
        Ok(price)
    }

    #[must_use]
    pub fn current_price(&self) -> f64 {
        self.state.current_price()
    }

    // ── Analytics & Charts ──────────────────────────────────────────

    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.analytics_service.summarize(
            &self.state.transactions,
            self.state.current_price(),
            self.state.settings.total_capital,
        )
    }

    #[must_use]
    pub fn portfolio_series(&self) -> Vec<ChartDataPoint> {
        self.chart_service
            .portfolio_series(&self.state.transactions, self.state.current_price())
    }

    #[must_use]
    pub fn entry_prices(&self) -> Vec<EntryPricePoint> {
        self.chart_service
            .entry_price_series(&self.state.transactions, self.state.current_price())
    }

    #[must_use]
    pub fn allocation(&self) -> CapitalAllocation {
        self.chart_service
            .capital_allocation(&self.state.transactions, self.state.current_price())
    }

    // ── Calculator ──────────────────────────────────────────────────

    /// BTC bought by `idr` at the current price, `None` without a price.
    #[must_use]
    pub fn idr_to_btc(&self, idr: f64) -> Option<f64> {
        self.portfolio_service.idr_to_btc(idr, self.state.current_price())
    }

    /// IDR value of `btc` at the current price, `None` without a price.
    #[must_use]
    pub fn btc_to_idr(&self, btc: f64) -> Option<f64> {
        self.portfolio_service.btc_to_idr(btc, self.state.current_price())
    }

    // ── Export / Import ─────────────────────────────────────────────

    #[must_use]
    pub fn export_csv(&self) -> String {
        self.export_service.to_csv(&self.state.transactions)
    }

    #[must_use]
    pub fn csv_file_name(&self, today: NaiveDate) -> String {
        self.export_service.csv_file_name(today)
    }

    pub fn export_json(&self) -> Result<String, CoreError> {
        self.export_service.to_json(&self.state.transactions)
    }

    /// Import transactions from a JSON export. Every record is checked
    /// before anything is written; ids already present are rejected. If the
    /// backend fails midway, records written so far are removed again.
    /// Returns the number of imported transactions.
    pub async fn import_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let incoming = self.export_service.from_json(json)?;

        let mut seen = std::collections::HashSet::new();
        for t in &incoming {
            if self.state.find(t.id).is_some() || !seen.insert(t.id) {
                return Err(CoreError::Validation(format!(
                    "Transaction {} already exists",
                    t.id
                )));
            }
        }

        let mut written: Vec<Uuid> = Vec::with_capacity(incoming.len());
        for t in &incoming {
            if let Err(e) = self.repository.create_transaction(t).await {
                tracing::warn!(error = %e, written = written.len(), "import failed, rolling back");
                for id in written {
                    if let Err(rollback) = self.repository.delete_transaction(id).await {
                        tracing::error!(%id, error = %rollback, "rollback failed");
                    }
                }
                return Err(e);
            }
            written.push(t.id);
        }

        let count = incoming.len();
        tracing::info!(count, "transactions imported");
        self.replace_state(|s| s.with_transactions(incoming));
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn replace_state(&mut self, update: impl FnOnce(AppState) -> AppState) {
        let current = std::mem::take(&mut self.state);
        self.state = update(current);
    }
}
