use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::repository::PortfolioRepository;
use super::vault::VaultDocument;
use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;

/// Volatile repository. Used for demos, tests and as a scratch backend.
#[derive(Default)]
pub struct InMemoryRepository {
    document: Mutex<VaultDocument>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing data.
    pub fn with_data(transactions: Vec<Transaction>, settings: Option<Settings>) -> Self {
        Self {
            document: Mutex::new(VaultDocument {
                transactions,
                settings,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VaultDocument> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryRepository {
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        self.lock().transactions.push(transaction.clone());
        Ok(())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.lock().transactions.clone())
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        let mut doc = self.lock();
        let idx = doc
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        doc.transactions.remove(idx);
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>, CoreError> {
        Ok(self.lock().settings.clone())
    }

    async fn upsert_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        self.lock().settings = Some(settings.clone());
        Ok(())
    }
}
