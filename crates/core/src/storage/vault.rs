use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::crypto::{self, KdfParams};
use super::envelope;
use super::repository::PortfolioRepository;
use crate::errors::CoreError;
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;

/// Everything a vault holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultDocument {
    pub transactions: Vec<Transaction>,
    pub settings: Option<Settings>,
}

impl VaultDocument {
    /// Flow: document → bincode → AES-256-GCM(Argon2id(password)) → BTCV bytes
    pub fn seal(&self, password: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize vault: {e}")))?;
        let payload = crypto::seal(&plaintext, password, params)?;
        Ok(envelope::encode(params, &payload))
    }

    /// Inverse of [`VaultDocument::seal`]. Returns the stored KDF parameters
    /// alongside the document so later writes keep using them.
    pub fn open(data: &[u8], password: &str) -> Result<(Self, KdfParams), CoreError> {
        let (params, payload) = envelope::decode(data)?;
        let plaintext = crypto::open(&payload, password, &params)?;
        let document = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize vault: {e}")))?;
        Ok((document, params))
    }
}

/// Password-protected file repository.
///
/// Every mutation rewrites the whole file before the in-memory copy is
/// updated, so a failed write leaves both disk and memory unchanged.
/// Constructors do their file and key work synchronously; call them before
/// the runtime starts or from a blocking task.
pub struct VaultRepository {
    path: PathBuf,
    password: String,
    kdf: KdfParams,
    document: Mutex<VaultDocument>,
}

impl std::fmt::Debug for VaultRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRepository")
            .field("path", &self.path)
            .field("kdf", &self.kdf)
            .finish_non_exhaustive()
    }
}

impl VaultRepository {
    /// Create an empty vault at `path`, overwriting nothing.
    pub fn create(
        path: impl Into<PathBuf>,
        password: &str,
        kdf: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.into();
        if path.exists() {
            return Err(CoreError::Persistence(format!(
                "Vault already exists at {}",
                path.display()
            )));
        }
        let repo = Self {
            path,
            password: password.to_string(),
            kdf,
            document: Mutex::new(VaultDocument::default()),
        };
        repo.write(&VaultDocument::default())?;
        tracing::info!(path = %repo.path.display(), "created vault");
        Ok(repo)
    }

    /// Open and decrypt an existing vault.
    pub fn open(path: impl Into<PathBuf>, password: &str) -> Result<Self, CoreError> {
        let path = path.into();
        let bytes = std::fs::read(&path)?;
        let (document, kdf) = VaultDocument::open(&bytes, password)?;
        tracing::debug!(
            path = %path.display(),
            transactions = document.transactions.len(),
            "opened vault"
        );
        Ok(Self {
            path,
            password: password.to_string(),
            kdf,
            document: Mutex::new(document),
        })
    }

    /// Open the vault at `path`, creating it with `kdf` if missing.
    pub fn open_or_create(
        path: impl Into<PathBuf>,
        password: &str,
        kdf: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.into();
        if path.exists() {
            Self::open(path, password)
        } else {
            Self::create(path, password, kdf)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("btcv.tmp")
    }

    fn write(&self, document: &VaultDocument) -> Result<(), CoreError> {
        let bytes = document.seal(&self.password, &self.kdf)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so a crash never leaves half a vault.
        let tmp = self.tmp_path();
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Seal on the blocking pool; Argon2id must not run on a runtime worker.
    async fn seal_blocking(&self, document: VaultDocument) -> Result<Vec<u8>, CoreError> {
        let password = self.password.clone();
        let kdf = self.kdf;
        tokio::task::spawn_blocking(move || document.seal(&password, &kdf))
            .await
            .map_err(|e| CoreError::Persistence(format!("Vault seal task failed: {e}")))?
    }

    async fn write_async(&self, document: &VaultDocument) -> Result<(), CoreError> {
        let bytes = self.seal_blocking(document.clone()).await?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply `change` to a copy of the document, persist it, then commit.
    async fn mutate<F>(&self, change: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut VaultDocument) -> Result<(), CoreError> + Send,
    {
        let mut doc = self.document.lock().await;
        let mut next = doc.clone();
        change(&mut next)?;
        self.write_async(&next).await?;
        *doc = next;
        Ok(())
    }
}

#[async_trait]
impl PortfolioRepository for VaultRepository {
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        self.mutate(|doc| {
            doc.transactions.push(transaction.clone());
            Ok(())
        })
        .await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.document.lock().await.transactions.clone())
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        self.mutate(|doc| {
            let idx = doc
                .transactions
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
            doc.transactions.remove(idx);
            Ok(())
        })
        .await
    }

    async fn load_settings(&self) -> Result<Option<Settings>, CoreError> {
        Ok(self.document.lock().await.settings.clone())
    }

    async fn upsert_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        self.mutate(|doc| {
            doc.settings = Some(settings.clone());
            Ok(())
        })
        .await
    }
}
