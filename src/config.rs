use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GuardConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scan: ScanConfig,
    pub alarm: AlarmConfig,
    pub beacon: BeaconConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Chance that the simulated detector reports an item as present.
    pub detection_probability: f64,
    pub default_mode: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlarmConfig {
    pub interval_ms: u64,
}

/// Peripherals visible to the host platform. `enabled = false` means the
/// pairing capability is absent altogether.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BeaconConfig {
    pub enabled: bool,
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Base URL of a History Service to mirror scan results to. Empty disables it.
    pub remote_url: String,
}

fn default_reachable() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_guard_dir()
            .join("prefs.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            detection_probability: crate::scan::DEFAULT_DETECTION_PROBABILITY,
            default_mode: crate::modes::DEFAULT_MODE.into(),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self { interval_ms: 800 }
    }
}

/// Returns `~/.pocketguard/`
pub fn default_guard_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".pocketguard")
}

/// Returns the default config file path: `~/.pocketguard/config.toml`
pub fn default_config_path() -> PathBuf {
    default_guard_dir().join("config.toml")
}

impl GuardConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            GuardConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (POCKETGUARD_DB, POCKETGUARD_LOG_LEVEL,
    /// POCKETGUARD_HISTORY_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("POCKETGUARD_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("POCKETGUARD_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("POCKETGUARD_HISTORY_URL") {
            self.history.remote_url = val;
        }
    }

    /// Resolve the preference store path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Detection probability clamped into `[0, 1]`, or the default when the
    /// configured value is not a finite number.
    pub fn detection_probability(&self) -> f64 {
        crate::scan::sanitize_probability(self.scan.detection_probability)
    }

    pub fn remote_history_url(&self) -> Option<&str> {
        let url = self.history.remote_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
