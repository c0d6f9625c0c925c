use serde::{Deserialize, Serialize};

use crate::format::format_idr;

/// Which side of the target price triggers a price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    /// Fire when the price is at or above the target
    #[default]
    Above,
    /// Fire when the price is at or below the target
    Below,
}

impl std::fmt::Display for PriceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceDirection::Above => write!(f, "above"),
            PriceDirection::Below => write!(f, "below"),
        }
    }
}

impl std::str::FromStr for PriceDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" => Ok(PriceDirection::Above),
            "below" => Ok(PriceDirection::Below),
            other => Err(format!("unknown direction '{other}', expected 'above' or 'below'")),
        }
    }
}

/// User alert preferences. Stored in the preference store, separate from
/// transaction data. Fields missing from stored JSON fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub low_capital_enabled: bool,

    /// Remaining-capital percentage at or below which the alert fires (1–50)
    pub low_capital_threshold_pct: f64,

    pub price_alert_enabled: bool,

    /// Target BTC/IDR price; 0 disables the price alert
    pub target_price: f64,

    pub direction: PriceDirection,
}

impl AlertConfig {
    pub const MIN_THRESHOLD_PCT: f64 = 1.0;
    pub const MAX_THRESHOLD_PCT: f64 = 50.0;
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            low_capital_enabled: true,
            low_capital_threshold_pct: 20.0,
            price_alert_enabled: true,
            target_price: 0.0,
            direction: PriceDirection::Above,
        }
    }
}

/// An alert whose condition currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Remaining capital has dropped to or below the configured share
    LowCapital {
        remaining_pct: f64,
        threshold_pct: f64,
    },
    /// The BTC price has crossed the configured target
    PriceTarget {
        direction: PriceDirection,
        target_price: f64,
        current_price: f64,
    },
}

impl Alert {
    /// Short message suitable for a banner or notification.
    pub fn message(&self) -> String {
        match self {
            Alert::LowCapital { remaining_pct, .. } => {
                format!("Remaining capital is low: {remaining_pct:.1}% of total capital")
            }
            Alert::PriceTarget {
                direction,
                target_price,
                ..
            } => format!(
                "Price alert: BTC is at or {direction} the target of {}",
                format_idr(*target_price)
            ),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
