//! Application configuration with sensible defaults.
//!
//! Can be overridden via ~/.config/hwstats/config.toml; missing fields keep
//! their defaults and an unreadable file falls back to pure defaults with a
//! logged warning.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::constants::*;

/// Everything the core consumes from the settings surface.
#[derive(Debug, Clone)]
pub struct Config {
    /// Polling interval in milliseconds.
    pub update_interval_ms: u64,
    /// Which sensor source to use.
    pub provider: ProviderConfig,
    /// Per-category publication toggles.
    pub modules: ModuleToggles,
    /// Temperature alert settings.
    pub alerts: AlertConfig,
}

/// Sensor source selection.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub source: ProviderSource,
    /// LibreHardwareMonitor HTTP JSON endpoint (used when source = lhm).
    pub lhm_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSource {
    /// Sample the machine hwstats runs on (sysinfo/NVML/sysfs).
    Local,
    /// Poll a LibreHardwareMonitor HTTP endpoint.
    Lhm,
}

impl ProviderSource {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "local" => Some(ProviderSource::Local),
            "lhm" => Some(ProviderSource::Lhm),
            _ => None,
        }
    }
}

/// Per-category enable flags. Disabled categories are classified but never
/// published.
#[derive(Debug, Clone, Copy)]
pub struct ModuleToggles {
    pub cpu: bool,
    pub gpu: bool,
    pub memory: bool,
    pub disks: bool,
    pub networks: bool,
    pub battery: bool,
    pub sensors: bool,
    pub fans: bool,
}

impl Default for ModuleToggles {
    fn default() -> Self {
        Self {
            cpu: true,
            gpu: true,
            memory: true,
            disks: true,
            networks: true,
            battery: true,
            sensors: true,
            fans: true,
        }
    }
}

/// Temperature alert settings.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub enabled: bool,
    /// CPU package temperature threshold (Celsius).
    pub cpu_temp_threshold: f32,
    /// GPU temperature threshold (Celsius).
    pub gpu_temp_threshold: f32,
    /// Threshold for every other temperature sensor (Celsius).
    pub general_temp_threshold: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cpu_temp_threshold: DEFAULT_CPU_TEMP_THRESHOLD_C,
            gpu_temp_threshold: DEFAULT_GPU_TEMP_THRESHOLD_C,
            general_temp_threshold: DEFAULT_GENERAL_TEMP_THRESHOLD_C,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            provider: ProviderConfig {
                source: ProviderSource::Local,
                lhm_url: DEFAULT_LHM_URL.to_string(),
            },
            modules: ModuleToggles::default(),
            alerts: AlertConfig::default(),
        }
    }
}

/// TOML-deserializable config file format.
/// All fields are optional; missing fields use defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    update_interval_ms: Option<u64>,
    provider: Option<FileProviderConfig>,
    modules: Option<FileModuleToggles>,
    alerts: Option<FileAlertConfig>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileProviderConfig {
    source: Option<String>,
    lhm_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileModuleToggles {
    cpu: Option<bool>,
    gpu: Option<bool>,
    memory: Option<bool>,
    disks: Option<bool>,
    networks: Option<bool>,
    battery: Option<bool>,
    sensors: Option<bool>,
    fans: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileAlertConfig {
    enabled: Option<bool>,
    cpu_temp_threshold: Option<f32>,
    gpu_temp_threshold: Option<f32>,
    general_temp_threshold: Option<f32>,
}

impl Config {
    /// Load config from ~/.config/hwstats/config.toml, falling back to
    /// defaults for any missing fields.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path. A missing file returns pure
    /// defaults; a malformed file logs a warning and returns defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Config::default();

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return config,
        };

        let file_config: FileConfig = match toml::from_str(&content) {
            Ok(fc) => fc,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config; using defaults");
                return config;
            }
        };

        if let Some(v) = file_config.update_interval_ms {
            config.update_interval_ms = v.max(MIN_UPDATE_INTERVAL_MS);
        }

        if let Some(p) = file_config.provider {
            if let Some(v) = p.source.as_deref().and_then(ProviderSource::from_name) {
                config.provider.source = v;
            }
            if let Some(v) = p.lhm_url {
                if !v.is_empty() {
                    config.provider.lhm_url = v;
                }
            }
        }

        if let Some(m) = file_config.modules {
            if let Some(v) = m.cpu {
                config.modules.cpu = v;
            }
            if let Some(v) = m.gpu {
                config.modules.gpu = v;
            }
            if let Some(v) = m.memory {
                config.modules.memory = v;
            }
            if let Some(v) = m.disks {
                config.modules.disks = v;
            }
            if let Some(v) = m.networks {
                config.modules.networks = v;
            }
            if let Some(v) = m.battery {
                config.modules.battery = v;
            }
            if let Some(v) = m.sensors {
                config.modules.sensors = v;
            }
            if let Some(v) = m.fans {
                config.modules.fans = v;
            }
        }

        if let Some(a) = file_config.alerts {
            if let Some(v) = a.enabled {
                config.alerts.enabled = v;
            }
            if let Some(v) = a.cpu_temp_threshold {
                config.alerts.cpu_temp_threshold =
                    v.clamp(MIN_TEMP_THRESHOLD_C, MAX_TEMP_THRESHOLD_C);
            }
            if let Some(v) = a.gpu_temp_threshold {
                config.alerts.gpu_temp_threshold =
                    v.clamp(MIN_TEMP_THRESHOLD_C, MAX_TEMP_THRESHOLD_C);
            }
            if let Some(v) = a.general_temp_threshold {
                config.alerts.general_temp_threshold =
                    v.clamp(MIN_TEMP_THRESHOLD_C, MAX_TEMP_THRESHOLD_C);
            }
        }

        config
    }
}
