// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError / EntryError Display and From impls
// ═══════════════════════════════════════════════════════════════════

use btc_tracker_core::errors::{CoreError, EntryError};

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn invalid_vault_format() {
        let err = CoreError::InvalidVaultFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid vault format: bad header");
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(
            CoreError::UnsupportedVersion(9).to_string(),
            "Unsupported vault version: 9"
        );
    }

    #[test]
    fn decryption_mentions_password() {
        assert!(CoreError::Decryption.to_string().contains("wrong password"));
    }

    #[test]
    fn api_error_names_provider() {
        let err = CoreError::Api {
            provider: "CoinGecko".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (CoinGecko): rate limited");
    }

    #[test]
    fn no_provider() {
        assert_eq!(
            CoreError::NoProvider("BTC/XYZ".into()).to_string(),
            "No price provider registered for BTC/XYZ"
        );
    }

    #[test]
    fn transaction_not_found() {
        let err = CoreError::TransactionNotFound("abc".into());
        assert_eq!(err.to_string(), "Transaction not found: abc");
    }
}

// ── Entry errors ────────────────────────────────────────────────────

mod entry {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            EntryError::NonPositiveBtc.to_string(),
            "BTC amount must be greater than zero"
        );
        assert_eq!(
            EntryError::NonPositiveIdr.to_string(),
            "IDR amount must be greater than zero"
        );
        assert_eq!(
            EntryError::NotANumber {
                field: "BTC amount",
                input: "x".into()
            }
            .to_string(),
            "BTC amount must be a number, got 'x'"
        );
    }

    #[test]
    fn insufficient_capital_shows_both_amounts() {
        let msg = EntryError::InsufficientCapital {
            requested: 2_000_000,
            remaining: 1_000_000.0,
        }
        .to_string();
        assert!(msg.contains("2000000"));
        assert!(msg.contains("1000000"));
    }

    #[test]
    fn converts_transparently_into_core_error() {
        let err: CoreError = EntryError::NonPositiveIdr.into();
        assert!(matches!(err, CoreError::InvalidEntry(EntryError::NonPositiveIdr)));
        assert_eq!(err.to_string(), "IDR amount must be greater than zero");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("missing")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_bincode_error() {
        let bin_err = bincode::deserialize::<String>(&[0xff]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn from_aes_gcm_error() {
        let err: CoreError = aes_gcm::Error.into();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
        assert_send_sync::<EntryError>();
    }
}
