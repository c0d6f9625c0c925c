use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;

/// Persistence capabilities the tracker needs from a backend.
///
/// Implementations must only report success once the change is durable;
/// callers update their in-memory state after a successful return and leave
/// it untouched on error.
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Store a new transaction.
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), CoreError>;

    /// All stored transactions, in insertion order.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError>;

    /// Permanently delete a transaction.
    /// Fails with [`CoreError::TransactionNotFound`] for an unknown id.
    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError>;

    /// Stored capital settings, `None` if never saved.
    async fn load_settings(&self) -> Result<Option<Settings>, CoreError>;

    /// Insert or replace the capital settings.
    async fn upsert_settings(&self, settings: &Settings) -> Result<(), CoreError>;
}
