use anyhow::{anyhow, Context};
use std::path::PathBuf;

pub const APP_DIR: &str = "btc-tracker";
pub const VAULT_FILE: &str = "portfolio.btcv";
pub const PREFERENCES_FILE: &str = "alerts.json";

/// Where data lives and how to unlock it.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    password: Option<String>,
}

impl Config {
    /// Build from command line values. Without an explicit directory the
    /// platform data directory is used, e.g. `~/.local/share/btc-tracker`.
    pub fn resolve(data_dir: Option<PathBuf>, password: Option<String>) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .context("no platform data directory; pass --data-dir")?
                .join(APP_DIR),
        };
        Ok(Self {
            data_dir,
            password: password.filter(|p| !p.is_empty()),
        })
    }

    pub fn vault_path(&self) -> PathBuf {
        self.data_dir.join(VAULT_FILE)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }

    pub fn password(&self) -> anyhow::Result<&str> {
        self.password
            .as_deref()
            .ok_or_else(|| anyhow!("vault password required: pass --password or set BTC_TRACKER_PASSWORD"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_used_as_is() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/btc")), Some("pw".into())).unwrap();
        assert_eq!(config.vault_path(), PathBuf::from("/tmp/btc/portfolio.btcv"));
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/btc/alerts.json"));
        assert_eq!(config.password().unwrap(), "pw");
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/btc")), Some(String::new())).unwrap();
        assert!(config.password().is_err());
    }
}
