//! Simulation configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Overlay topology settings.
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Overlay topology configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Number of relay nodes to bootstrap.
    #[serde(default = "default_relay_count")]
    pub relay_count: u32,
    /// Number of user nodes to bootstrap.
    #[serde(default = "default_user_count")]
    pub user_count: u32,
    /// Bound on a single hop's response time, in milliseconds.
    #[serde(default = "default_hop_timeout_ms")]
    pub hop_timeout_ms: u64,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_relay_count() -> u32 {
    5
}

fn default_user_count() -> u32 {
    2
}

fn default_hop_timeout_ms() -> u64 {
    shallot_transport::DEFAULT_HOP_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            relay_count: default_relay_count(),
            user_count: default_user_count(),
            hop_timeout_ms: default_hop_timeout_ms(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl SimConfig {
    /// Load configuration from the config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: SimConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Config file path, overridable via `SHALLOT_CONFIG`.
    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SHALLOT_CONFIG") {
            return PathBuf::from(path);
        }
        PathBuf::from("shallot.toml")
    }
}
