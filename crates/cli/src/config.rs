//! usbtree configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use topology::BackendKind;

/// Allowed range for `discovery.fallback_root_hubs`
const FALLBACK_ROOT_HUBS_RANGE: std::ops::RangeInclusive<u8> = 1..=8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default = "GeneralSettings::default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

impl GeneralSettings {
    fn default_log_level() -> String {
        // Warnings about fallback data still reach stderr
        "warn".to_string()
    }
}

/// Which backends to try, and how to run them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Backends in preference order
    #[serde(default = "DiscoverySettings::default_backends")]
    pub backends: Vec<BackendKind>,
    /// `lsusb` executable (looked up on `PATH` unless it contains a slash)
    #[serde(default = "DiscoverySettings::default_lsusb_path")]
    pub lsusb_path: String,
    /// `system_profiler` executable
    #[serde(default = "DiscoverySettings::default_system_profiler_path")]
    pub system_profiler_path: String,
    /// Root hubs shown when no backend finds anything
    #[serde(default = "DiscoverySettings::default_fallback_root_hubs")]
    pub fallback_root_hubs: u8,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            backends: Self::default_backends(),
            lsusb_path: Self::default_lsusb_path(),
            system_profiler_path: Self::default_system_profiler_path(),
            fallback_root_hubs: Self::default_fallback_root_hubs(),
        }
    }
}

impl DiscoverySettings {
    fn default_backends() -> Vec<BackendKind> {
        if cfg!(target_os = "macos") {
            vec![BackendKind::Libusb, BackendKind::SystemProfiler]
        } else {
            vec![BackendKind::Libusb, BackendKind::Lsusb]
        }
    }

    fn default_lsusb_path() -> String {
        "lsusb".to_string()
    }

    fn default_system_profiler_path() -> String {
        "system_profiler".to_string()
    }

    fn default_fallback_root_hubs() -> u8 {
        // Most Macs expose more controllers than a typical Linux box
        if cfg!(target_os = "macos") { 4 } else { 2 }
    }

    /// `lsusb_path` with `~` expanded
    pub fn lsusb_command(&self) -> PathBuf {
        expand_path(&self.lsusb_path)
    }

    /// `system_profiler_path` with `~` expanded
    pub fn system_profiler_command(&self) -> PathBuf {
        expand_path(&self.system_profiler_path)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Show serial, speed, power and location under each device
    #[serde(default)]
    pub verbose: bool,
    /// Print JSON instead of a tree
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from the specified path
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            expand_path(&p.to_string_lossy())
        } else {
            // Try standard locations in order
            let candidates = vec![Self::default_path(), PathBuf::from("/etc/usbtree/config.toml")];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::debug!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usbtree").join("config.toml")
        } else {
            PathBuf::from(".config/usbtree/config.toml")
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.discovery.backends.is_empty() {
            return Err(anyhow!("discovery.backends must name at least one backend"));
        }

        if !FALLBACK_ROOT_HUBS_RANGE.contains(&self.discovery.fallback_root_hubs) {
            return Err(anyhow!(
                "Invalid fallback_root_hubs {}, must be between {} and {}",
                self.discovery.fallback_root_hubs,
                FALLBACK_ROOT_HUBS_RANGE.start(),
                FALLBACK_ROOT_HUBS_RANGE.end()
            ));
        }

        for (name, path) in [
            ("lsusb_path", &self.discovery.lsusb_path),
            ("system_profiler_path", &self.discovery.system_profiler_path),
        ] {
            if path.trim().is_empty() {
                return Err(anyhow!("discovery.{} must not be empty", name));
            }
        }

        Ok(())
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
