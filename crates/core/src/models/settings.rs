use serde::{Deserialize, Serialize};

/// Default capital for a fresh portfolio: 100 million rupiah.
pub const DEFAULT_TOTAL_CAPITAL: f64 = 100_000_000.0;

/// Capital settings, persisted next to the transactions through the
/// repository's upsert-settings capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Total IDR the user has budgeted for BTC purchases.
    pub total_capital: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_capital: DEFAULT_TOTAL_CAPITAL,
        }
    }
}
