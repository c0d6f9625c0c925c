use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertConfig, PriceDirection};

/// Evaluates the user's alert rules against the current numbers.
///
/// Alerts are level-triggered: every call re-evaluates from scratch and an
/// alert is reported for as long as its condition holds. Nothing remembers
/// that an alert already fired.
pub struct AlertService;

impl AlertService {
    pub fn new() -> Self {
        Self
    }

    /// Return every alert whose condition currently holds, low-capital first.
    pub fn evaluate(
        &self,
        remaining_capital: f64,
        total_capital: f64,
        current_price: f64,
        config: &AlertConfig,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if config.low_capital_enabled && total_capital > 0.0 {
            let remaining_pct = remaining_capital / total_capital * 100.0;
            if remaining_pct <= config.low_capital_threshold_pct {
                alerts.push(Alert::LowCapital {
                    remaining_pct,
                    threshold_pct: config.low_capital_threshold_pct,
                });
            }
        }

        if config.price_alert_enabled && config.target_price > 0.0 {
            let hit = match config.direction {
                PriceDirection::Above => current_price >= config.target_price,
                PriceDirection::Below => current_price <= config.target_price,
            };
            if hit {
                alerts.push(Alert::PriceTarget {
                    direction: config.direction,
                    target_price: config.target_price,
                    current_price,
                });
            }
        }

        alerts
    }

    /// Check a config before it is saved.
    pub fn validate_config(&self, config: &AlertConfig) -> Result<(), CoreError> {
        let threshold = config.low_capital_threshold_pct;
        if !(AlertConfig::MIN_THRESHOLD_PCT..=AlertConfig::MAX_THRESHOLD_PCT).contains(&threshold) {
            return Err(CoreError::Validation(format!(
                "Low-capital threshold must be between {}% and {}%, got {threshold}%",
                AlertConfig::MIN_THRESHOLD_PCT,
                AlertConfig::MAX_THRESHOLD_PCT,
            )));
        }
        if !config.target_price.is_finite() || config.target_price < 0.0 {
            return Err(CoreError::Validation(format!(
                "Target price must be a non-negative number, got {}",
                config.target_price
            )));
        }
        Ok(())
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}
