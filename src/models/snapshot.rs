//! Normalized per-category hardware snapshots.
//!
//! Every snapshot is an immutable value record stamped at construction and
//! valid for exactly one polling tick. Nothing here is mutated after it is
//! built; consumers own what they receive.

use chrono::{DateTime, Utc};

/// One logical CPU core within a [`CpuSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoreReading {
    pub core_id: u32,
    /// Load percentage (0-100).
    pub load: f32,
    /// Temperature in Celsius.
    pub temperature: f32,
    /// Clock in MHz.
    pub clock: f32,
}

/// CPU state for one tick. Core ids are unique and sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSnapshot {
    pub name: String,
    pub total_load: f32,
    pub package_temperature: f32,
    pub package_power: f32,
    pub cores: Vec<CoreReading>,
    pub timestamp: DateTime<Utc>,
}

/// GPU vendor, derived from the provider's hardware category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuVendor {
    #[default]
    Unknown,
    Nvidia,
    Amd,
    Intel,
}

/// GPU state for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuSnapshot {
    pub name: String,
    pub vendor: GpuVendor,
    pub core_load: f32,
    pub memory_load: f32,
    pub temperature: f32,
    pub core_clock: f32,
    pub memory_clock: f32,
    pub memory_used: u64,
    pub memory_total: u64,
    pub power: f32,
    pub fan_speed: f32,
    pub timestamp: DateTime<Utc>,
}

/// System memory state for one tick. All values in bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub used: u64,
    pub available: u64,
    pub total: u64,
    pub timestamp: DateTime<Utc>,
}

impl MemorySnapshot {
    pub fn used_percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.used as f32 / self.total as f32) * 100.0
    }
}

/// One physical disk for one tick.
///
/// Total space is not reported by the hardware-tree provider path, so it
/// stays 0 and `usage_percentage` reports 0 until a provider supplies it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSnapshot {
    pub name: String,
    pub drive_letter: String,
    /// Read rate in bytes per second.
    pub read_rate: u64,
    /// Write rate in bytes per second.
    pub write_rate: u64,
    pub used_space: u64,
    pub total_space: u64,
    pub temperature: f32,
    pub timestamp: DateTime<Utc>,
}

impl DiskSnapshot {
    pub fn usage_percentage(&self) -> f32 {
        if self.total_space == 0 {
            return 0.0;
        }
        (self.used_space as f32 / self.total_space as f32) * 100.0
    }
}

/// One network adapter for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub adapter_name: String,
    /// Download rate in bytes per second.
    pub download_rate: u64,
    /// Upload rate in bytes per second.
    pub upload_rate: u64,
    /// Cumulative bytes downloaded.
    pub total_downloaded: u64,
    /// Cumulative bytes uploaded.
    pub total_uploaded: u64,
    pub is_connected: bool,
    pub timestamp: DateTime<Utc>,
}

/// Battery charging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatteryStatus {
    #[default]
    NotPresent,
    Discharging,
    Idle,
    Charging,
}

/// Battery state for one tick. Capacities in mWh, rate in mW (signed:
/// positive while charging, negative while discharging).
#[derive(Debug, Clone, PartialEq)]
pub struct BatterySnapshot {
    pub is_present: bool,
    /// Charge level percentage (0-100).
    pub charge_level: f32,
    pub status: BatteryStatus,
    pub design_capacity: i32,
    pub full_charge_capacity: i32,
    pub remaining_capacity: i32,
    pub charge_rate: i32,
    /// Estimated time remaining. Not derivable from the hardware-tree
    /// provider path; stays `None` there.
    pub time_remaining: Option<std::time::Duration>,
    pub timestamp: DateTime<Utc>,
}

impl BatterySnapshot {
    /// Battery wear indicator: full-charge capacity relative to design
    /// capacity. 100 when the design capacity is unknown.
    pub fn health_percentage(&self) -> f32 {
        if self.design_capacity <= 0 {
            return 100.0;
        }
        self.full_charge_capacity as f32 / self.design_capacity as f32 * 100.0
    }
}

/// Generic sensor category. The unit string is derived purely from the
/// category, never stored per reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCategory {
    Temperature,
    Voltage,
    Power,
    Fan,
    Clock,
    Load,
    Data,
    Throughput,
}

impl SensorCategory {
    pub fn unit(self) -> &'static str {
        match self {
            SensorCategory::Temperature => "°C",
            SensorCategory::Voltage => "V",
            SensorCategory::Power => "W",
            SensorCategory::Fan => "RPM",
            SensorCategory::Clock => "MHz",
            SensorCategory::Load => "%",
            SensorCategory::Data => "GB",
            SensorCategory::Throughput => "B/s",
        }
    }
}

/// One generic sensor reading surfaced to consumers (tray lists, sensor
/// tables) regardless of which hardware it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub name: String,
    /// Name of the hardware node that owns this sensor.
    pub hardware_name: String,
    pub category: SensorCategory,
    pub value: f32,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn unit(&self) -> &'static str {
        self.category.unit()
    }
}

/// One fan for one tick. There is no control path, so `is_controllable`
/// is always false.
#[derive(Debug, Clone, PartialEq)]
pub struct FanReading {
    /// Composite name: `"<hardware> - <sensor>"`.
    pub name: String,
    pub current_rpm: f32,
    pub target_rpm: Option<f32>,
    pub speed_percentage: Option<f32>,
    pub is_controllable: bool,
    pub timestamp: DateTime<Utc>,
}

/// Everything the Snapshot Builder produces for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotSet {
    pub cpu: Option<CpuSnapshot>,
    pub gpu: Option<GpuSnapshot>,
    pub memory: Option<MemorySnapshot>,
    pub disks: Vec<DiskSnapshot>,
    pub networks: Vec<NetworkSnapshot>,
    pub battery: Option<BatterySnapshot>,
    pub sensors: Vec<SensorReading>,
    pub fans: Vec<FanReading>,
}
