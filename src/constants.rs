//! Application-wide constants.
//!
//! Centralizes the polling defaults, unit conversion factors, and alert
//! thresholds used across the crate.

use std::path::PathBuf;

// ── Timing ────────────────────────────────────────────────────────
/// Minimum allowed update interval (ms) to prevent excessive CPU usage.
pub const MIN_UPDATE_INTERVAL_MS: u64 = 100;
/// Default update interval (ms).
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;
/// Minimum elapsed time between two alerts for the same alert key (seconds).
pub const ALERT_COOLDOWN_SECS: i64 = 300;
/// HTTP timeout for the LibreHardwareMonitor endpoint (seconds).
pub const LHM_HTTP_TIMEOUT_SECS: u64 = 3;

// ── Channels ──────────────────────────────────────────────────────
/// Capacity of each per-category broadcast channel. A lagging subscriber
/// loses its oldest snapshots rather than stalling the loop.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

// ── Unit Conversion ───────────────────────────────────────────────
/// One MiB in bytes (GPU memory readings arrive in MiB).
pub const MIB: u64 = 1024 * 1024;
/// One GiB in bytes (memory/storage/network data readings arrive in GiB).
pub const GIB: u64 = 1024 * 1024 * 1024;
/// Battery energy readings arrive in Wh; capacities are kept in mWh.
pub const WH_TO_MWH: f32 = 1000.0;

// ── Alert Thresholds ──────────────────────────────────────────────
/// Default CPU package temperature threshold (Celsius).
pub const DEFAULT_CPU_TEMP_THRESHOLD_C: f32 = 85.0;
/// Default GPU temperature threshold (Celsius).
pub const DEFAULT_GPU_TEMP_THRESHOLD_C: f32 = 85.0;
/// Default threshold for all other temperature sensors (Celsius).
pub const DEFAULT_GENERAL_TEMP_THRESHOLD_C: f32 = 90.0;
/// Lowest configurable temperature threshold (Celsius).
pub const MIN_TEMP_THRESHOLD_C: f32 = 30.0;
/// Highest configurable temperature threshold (Celsius).
pub const MAX_TEMP_THRESHOLD_C: f32 = 150.0;

// ── Provider Defaults ─────────────────────────────────────────────
/// Default LibreHardwareMonitor HTTP JSON URL.
pub const DEFAULT_LHM_URL: &str = "http://localhost:8085/data.json";
/// Battery sysfs directory scanned by the local provider.
pub const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";
/// Minimum disk size for the local provider to report (bytes).
pub const MIN_DISK_SIZE_BYTES: u64 = 1_000_000_000;
/// Maximum hwmon temperature sensor index to probe.
pub const MAX_HWMON_SENSORS: u32 = 32;
/// Disk sector size (bytes) for I/O calculation.
pub const SECTOR_SIZE_BYTES: u64 = 512;
/// Minimum fields expected in a /proc/diskstats line.
pub const MIN_DISKSTATS_FIELDS: usize = 14;

// ── Paths ─────────────────────────────────────────────────────────

/// Returns the user's home directory, falling back to /tmp.
pub fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Returns `~/.config/hwstats/`.
pub fn config_dir() -> PathBuf {
    home_dir().join(".config").join("hwstats")
}

/// Returns `~/.config/hwstats/config.toml`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
