// ═══════════════════════════════════════════════════════════════════
// Storage Tests: crypto, vault envelope, VaultRepository,
// InMemoryRepository, preference stores
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use btc_tracker_core::errors::CoreError;
use btc_tracker_core::models::alert::{AlertConfig, PriceDirection};
use btc_tracker_core::models::settings::Settings;
use btc_tracker_core::models::transaction::Transaction;
use btc_tracker_core::storage::crypto::{self, KdfParams};
use btc_tracker_core::storage::envelope::{self, HEADER_LEN, MAGIC};
use btc_tracker_core::storage::memory::InMemoryRepository;
use btc_tracker_core::storage::preferences::{
    InMemoryPreferenceStore, JsonPreferenceStore, PreferenceStore, ALERT_SETTINGS_KEY,
};
use btc_tracker_core::storage::repository::PortfolioRepository;
use btc_tracker_core::storage::vault::{VaultDocument, VaultRepository};

const PASSWORD: &str = "correct horse battery staple";

fn tx(day: u32, btc: f64, idr: u64) -> Transaction {
    Transaction::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), btc, idr)
}

// ═══════════════════════════════════════════════════════════════════
// Crypto
// ═══════════════════════════════════════════════════════════════════

mod crypto_tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let params = KdfParams::light();
        let sealed = crypto::seal(b"hello vault", PASSWORD, &params).unwrap();
        assert_ne!(sealed.ciphertext, b"hello vault");
        assert_eq!(crypto::open(&sealed, PASSWORD, &params).unwrap(), b"hello vault");
    }

    #[test]
    fn wrong_password_is_decryption_error() {
        let params = KdfParams::light();
        let sealed = crypto::seal(b"secret", PASSWORD, &params).unwrap();
        assert!(matches!(
            crypto::open(&sealed, "nope", &params),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let params = KdfParams::light();
        let mut sealed = crypto::seal(b"secret", PASSWORD, &params).unwrap();
        sealed.ciphertext[0] ^= 0x01;
        assert!(matches!(
            crypto::open(&sealed, PASSWORD, &params),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn fresh_salt_and_nonce_each_time() {
        let params = KdfParams::light();
        let a = crypto::seal(b"same", PASSWORD, &params).unwrap();
        let b = crypto::seal(b"same", PASSWORD, &params).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn key_derivation_is_deterministic() {
        let params = KdfParams::light();
        let salt = [7u8; crypto::SALT_LEN];
        let k1 = crypto::derive_key(PASSWORD, &salt, &params).unwrap();
        let k2 = crypto::derive_key(PASSWORD, &salt, &params).unwrap();
        let k3 = crypto::derive_key("other", &salt, &params).unwrap();
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn invalid_params_are_encryption_error() {
        let params = KdfParams {
            memory_cost: 1,
            time_cost: 1,
            parallelism: 1,
        };
        let salt = [0u8; crypto::SALT_LEN];
        assert!(matches!(
            crypto::derive_key(PASSWORD, &salt, &params),
            Err(CoreError::Encryption(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Envelope
// ═══════════════════════════════════════════════════════════════════

mod envelope_tests {
    use super::*;

    fn sealed_bytes() -> Vec<u8> {
        let params = KdfParams::light();
        let sealed = crypto::seal(b"payload", PASSWORD, &params).unwrap();
        envelope::encode(&params, &sealed)
    }

    #[test]
    fn header_layout() {
        let bytes = sealed_bytes();
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), envelope::CURRENT_VERSION);
        assert!(bytes.len() > HEADER_LEN);
    }

    #[test]
    fn decode_restores_params_and_payload() {
        let params = KdfParams::light();
        let sealed = crypto::seal(b"payload", PASSWORD, &params).unwrap();
        let (p, s) = envelope::decode(&envelope::encode(&params, &sealed)).unwrap();
        assert_eq!(p, params);
        assert_eq!(s, sealed);
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            envelope::decode(b"BTCV"),
            Err(CoreError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn bad_magic() {
        let mut bytes = sealed_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            envelope::decode(&bytes),
            Err(CoreError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn future_version() {
        let mut bytes = sealed_bytes();
        bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
        assert!(matches!(
            envelope::decode(&bytes),
            Err(CoreError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn huge_memory_cost_is_refused() {
        let mut bytes = sealed_bytes();
        bytes[6..10].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            envelope::decode(&bytes),
            Err(CoreError::InvalidVaultFormat(ref m)) if m.contains("memory_cost")
        ));
    }

    #[test]
    fn truncated_ciphertext() {
        let bytes = sealed_bytes();
        assert!(matches!(
            envelope::decode(&bytes[..bytes.len() - 1]),
            Err(CoreError::InvalidVaultFormat(ref m)) if m.contains("truncated")
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// VaultRepository
// ═══════════════════════════════════════════════════════════════════

mod vault {
    use super::*;

    fn new_vault(dir: &TempDir) -> VaultRepository {
        VaultRepository::create(dir.path().join("portfolio.btcv"), PASSWORD, KdfParams::light()).unwrap()
    }

    #[test]
    fn document_seal_open() {
        let doc = VaultDocument {
            transactions: vec![tx(1, 0.005, 5_000_000)],
            settings: Some(Settings { total_capital: 42.0 }),
        };
        let bytes = doc.seal(PASSWORD, &KdfParams::light()).unwrap();
        let (back, params) = VaultDocument::open(&bytes, PASSWORD).unwrap();
        assert_eq!(back, doc);
        assert_eq!(params, KdfParams::light());
    }

    #[tokio::test]
    async fn create_writes_empty_vault() {
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        assert!(vault.path().exists());
        assert!(vault.list_transactions().await.unwrap().is_empty());
        assert!(vault.load_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let _ = new_vault(&dir);
        let again = VaultRepository::create(dir.path().join("portfolio.btcv"), PASSWORD, KdfParams::light());
        assert!(matches!(again, Err(CoreError::Persistence(_))));
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portfolio.btcv");
        let t = Transaction::with_notes(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            0.0042,
            4_200_000,
            "halving week",
        );
        {
            let vault = VaultRepository::create(&path, PASSWORD, KdfParams::light()).unwrap();
            vault.create_transaction(&t).await.unwrap();
            vault
                .upsert_settings(&Settings { total_capital: 250_000_000.0 })
                .await
                .unwrap();
        }

        let reopened = VaultRepository::open(&path, PASSWORD).unwrap();
        assert_eq!(reopened.list_transactions().await.unwrap(), vec![t]);
        assert_eq!(
            reopened.load_settings().await.unwrap(),
            Some(Settings { total_capital: 250_000_000.0 })
        );
    }

    #[tokio::test]
    async fn wrong_password_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        let path = vault.path().to_path_buf();
        drop(vault);
        assert!(matches!(
            VaultRepository::open(&path, "wrong"),
            Err(CoreError::Decryption)
        ));
    }

    #[tokio::test]
    async fn delete_is_persisted() {
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        let a = tx(1, 0.001, 1_000_000);
        let b = tx(2, 0.002, 2_000_000);
        vault.create_transaction(&a).await.unwrap();
        vault.create_transaction(&b).await.unwrap();
        vault.delete_transaction(a.id).await.unwrap();

        let reopened = VaultRepository::open(vault.path(), PASSWORD).unwrap();
        assert_eq!(reopened.list_transactions().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn delete_unknown_id() {
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        assert!(matches!(
            vault.delete_transaction(Uuid::new_v4()).await,
            Err(CoreError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_or_create_handles_both() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("portfolio.btcv");
        let vault = VaultRepository::open_or_create(&path, PASSWORD, KdfParams::light()).unwrap();
        vault.create_transaction(&tx(1, 0.1, 1)).await.unwrap();
        drop(vault);

        let vault = VaultRepository::open_or_create(&path, PASSWORD, KdfParams::light()).unwrap();
        assert_eq!(vault.list_transactions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        // A directory where the temp file should go makes the write fail.
        std::fs::create_dir(vault.path().with_extension("btcv.tmp")).unwrap();

        let result = vault.create_transaction(&tx(1, 0.1, 1)).await;
        assert!(matches!(result, Err(CoreError::FileIO(_))));
        assert!(vault.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_do_not_block_the_runtime() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::Arc;

        // Single-threaded runtime: the counter only moves while the write yields.
        let dir = TempDir::new().unwrap();
        let vault = new_vault(&dir);
        let stop = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let (stop, ticks) = (stop.clone(), ticks.clone());
            async move {
                while !stop.load(Ordering::SeqCst) {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            }
        });

        vault.create_transaction(&tx(1, 0.1, 1)).await.unwrap();
        let during_write = ticks.load(Ordering::SeqCst);
        stop.store(true, Ordering::SeqCst);
        ticker.await.unwrap();

        assert!(during_write > 0);
        assert_eq!(vault.list_transactions().await.unwrap().len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// InMemoryRepository
// ═══════════════════════════════════════════════════════════════════

mod memory {
    use super::*;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let repo = InMemoryRepository::new();
        let a = tx(5, 0.1, 1);
        let b = tx(1, 0.2, 2);
        repo.create_transaction(&a).await.unwrap();
        repo.create_transaction(&b).await.unwrap();
        assert_eq!(repo.list_transactions().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn delete_and_missing() {
        let a = tx(1, 0.1, 1);
        let repo = InMemoryRepository::with_data(vec![a.clone()], None);
        repo.delete_transaction(a.id).await.unwrap();
        assert!(repo.list_transactions().await.unwrap().is_empty());
        assert!(repo.delete_transaction(a.id).await.is_err());
    }

    #[tokio::test]
    async fn settings_upsert() {
        let repo = InMemoryRepository::default();
        assert!(repo.load_settings().await.unwrap().is_none());
        repo.upsert_settings(&Settings { total_capital: 1.0 }).await.unwrap();
        repo.upsert_settings(&Settings { total_capital: 2.0 }).await.unwrap();
        assert_eq!(repo.load_settings().await.unwrap(), Some(Settings { total_capital: 2.0 }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Preference stores
// ═══════════════════════════════════════════════════════════════════

mod preferences {
    use super::*;

    fn custom() -> AlertConfig {
        AlertConfig {
            low_capital_threshold_pct: 10.0,
            target_price: 1_750_000_000.0,
            direction: PriceDirection::Below,
            ..AlertConfig::default()
        }
    }

    #[test]
    fn json_store_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonPreferenceStore::new(dir.path().join("alerts.json"));
        assert_eq!(store.load_alert_config().unwrap(), AlertConfig::default());
    }

    #[test]
    fn json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.json");
        JsonPreferenceStore::new(&path).save_alert_config(&custom()).unwrap();
        assert_eq!(JsonPreferenceStore::new(&path).load_alert_config().unwrap(), custom());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[ALERT_SETTINGS_KEY]["direction"], "below");
    }

    #[test]
    fn json_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        JsonPreferenceStore::new(&path).save_alert_config(&custom()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[test]
    fn json_store_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "[1,2,3]").unwrap();
        assert!(matches!(
            JsonPreferenceStore::new(&path).load_alert_config(),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn memory_store() {
        let store = InMemoryPreferenceStore::new();
        assert_eq!(store.load_alert_config().unwrap(), AlertConfig::default());
        store.save_alert_config(&custom()).unwrap();
        assert_eq!(store.load_alert_config().unwrap(), custom());
    }
}
