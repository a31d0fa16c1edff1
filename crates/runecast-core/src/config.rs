//! Engine configuration.
//!
//! Resolution order, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. `<data_dir>/config.json`, if present
//! 3. `RUNECAST_*` environment variables
//!
//! Front ends apply their own flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RuneError, RuneResult};

pub const CONFIG_FILE: &str = "config.json";
pub const DATABASE_FILE: &str = "runecast.redb";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuneConfig {
    /// Directory holding the database and config file
    pub data_dir: PathBuf,
    /// Endpoint of the interpretation function (disabled when unset)
    pub interpretation_url: Option<String>,
    /// Base URL of the billing functions (disabled when unset)
    pub billing_url: Option<String>,
    /// Price used by `checkout` when none is given
    pub premium_price_id: Option<String>,
    /// Timeout applied to every remote gateway request
    pub request_timeout_secs: u64,
    /// Directory for JSONL logs (disabled when unset)
    pub log_dir: Option<PathBuf>,
}

impl Default for RuneConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            interpretation_url: None,
            billing_url: None,
            premium_price_id: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_dir: None,
        }
    }
}

impl RuneConfig {
    /// Load config for a data directory, then apply environment overrides.
    pub fn load(data_dir: impl AsRef<Path>) -> RuneResult<Self> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            debug!(path = %path.display(), "loading config file");
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<RuneConfig>(&raw)
                .map_err(|e| RuneError::Serialization(format!("{}: {e}", path.display())))?
        } else {
            RuneConfig::default()
        };
        config.data_dir = data_dir.to_path_buf();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `RUNECAST_*` overrides from a lookup function.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("RUNECAST_INTERPRETATION_URL") {
            self.interpretation_url = Some(url);
        }
        if let Some(url) = non_empty("RUNECAST_BILLING_URL") {
            self.billing_url = Some(url);
        }
        if let Some(price) = non_empty("RUNECAST_PRICE_ID") {
            self.premium_price_id = Some(price);
        }
        if let Some(secs) = non_empty("RUNECAST_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(dir) = non_empty("RUNECAST_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_no_file() {
        let temp = TempDir::new().unwrap();
        let mut config = RuneConfig::load(temp.path()).unwrap();
        config.apply_env(|_| None);

        assert_eq!(config.data_dir, temp.path());
        assert_eq!(config.database_path(), temp.path().join(DATABASE_FILE));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"interpretation_url":"https://fn.example/interpret"}"#,
        )
        .unwrap();

        let config = RuneConfig::load(temp.path()).unwrap();
        assert!(config.interpretation_url.is_some());
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "{not json").unwrap();
        assert!(matches!(
            RuneConfig::load(temp.path()),
            Err(RuneError::Serialization(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RUNECAST_BILLING_URL", "https://billing.example"),
            ("RUNECAST_REQUEST_TIMEOUT", "5"),
            ("RUNECAST_PRICE_ID", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = RuneConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.billing_url.as_deref(), Some("https://billing.example"));
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.premium_price_id.is_none());
    }
}
