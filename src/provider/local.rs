//! Local sensor provider backed by sysinfo, NVML, and Linux sysfs.
//!
//! Synthesizes the same hardware-tree shape a LibreHardwareMonitor endpoint
//! would report, using the canonical reading names the Snapshot Builder
//! classifies ("CPU Total", "CPU Core #1", "Memory Used", "Download
//! Speed", ...). Each source fails soft: no NVIDIA GPU, no battery, or no
//! readable sysfs simply means that subtree is absent.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use sysinfo::{Disks, Networks, System};

use crate::constants::{
    GIB, MIB, MIN_DISKSTATS_FIELDS, MIN_DISK_SIZE_BYTES, MAX_HWMON_SENSORS, POWER_SUPPLY_DIR,
    SECTOR_SIZE_BYTES,
};
use crate::models::{HardwareKind, HardwareNode, Reading, ReadingKind};
use crate::provider::{ProviderError, SensorProvider};

/// Everything acquired by `open()` and released by `close()`.
struct Handles {
    sys: System,
    networks: Networks,
    disks: Disks,
    nvml: Option<nvml_wrapper::Nvml>,
}

/// Provider that samples the machine it runs on.
pub struct LocalProvider {
    handles: Option<Handles>,
    /// Previous disk I/O counters for delta calculation.
    prev_disk_io: HashMap<String, (u64, u64)>,
    /// Timestamp of the previous refresh, for rate calculation.
    last_refresh: Instant,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self {
            handles: None,
            prev_disk_io: HashMap::new(),
            last_refresh: Instant::now(),
        }
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorProvider for LocalProvider {
    async fn open(&mut self) -> Result<(), ProviderError> {
        let mut sys = System::new_all();
        sys.refresh_all();

        self.handles = Some(Handles {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            // Fails gracefully on machines without an NVIDIA GPU.
            nvml: nvml_wrapper::Nvml::init().ok(),
        });
        self.prev_disk_io.clear();
        self.last_refresh = Instant::now();
        Ok(())
    }

    async fn refresh(&mut self) -> Result<Vec<HardwareNode>, ProviderError> {
        let handles = self.handles.as_mut().ok_or(ProviderError::NotOpen)?;

        handles.sys.refresh_cpu_all();
        handles.sys.refresh_memory();
        handles.networks.refresh();
        handles.disks.refresh();

        let elapsed = self.last_refresh.elapsed().as_secs_f64().max(0.1);
        self.last_refresh = Instant::now();

        let mut roots = vec![cpu_node(&handles.sys), memory_node(&handles.sys)];

        if let Some(gpu) = handles.nvml.as_ref().and_then(gpu_node) {
            roots.push(gpu);
        }

        let disk_io = parse_diskstats(
            &std::fs::read_to_string("/proc/diskstats").unwrap_or_default(),
        );
        for disk in disk_nodes(&handles.disks, &disk_io, &self.prev_disk_io, elapsed) {
            roots.push(disk);
        }
        self.prev_disk_io = disk_io;

        for adapter in network_nodes(&handles.networks, elapsed) {
            roots.push(adapter);
        }

        if let Some(battery) = battery_node_at(Path::new(POWER_SUPPLY_DIR)) {
            roots.push(battery);
        }

        Ok(roots)
    }

    fn close(&mut self) {
        self.handles = None;
        self.prev_disk_io.clear();
    }
}

// ── CPU ───────────────────────────────────────────────────────────

fn cpu_node(sys: &System) -> HardwareNode {
    let name = sys
        .cpus()
        .first()
        .map(|c| c.brand().trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "CPU".to_string());

    let mut node = HardwareNode::new(name, HardwareKind::Cpu)
        .with_reading(Reading::new("CPU Total", ReadingKind::Load, sys.global_cpu_usage()));

    for (i, cpu) in sys.cpus().iter().enumerate() {
        let id = i + 1;
        node.readings.push(Reading::new(
            format!("CPU Core #{id}"),
            ReadingKind::Load,
            cpu.cpu_usage(),
        ));
        node.readings.push(Reading::new(
            format!("CPU Core #{id}"),
            ReadingKind::Clock,
            cpu.frequency() as f32,
        ));
    }

    node.readings.extend(hwmon_cpu_temps());
    node
}

/// Read CPU temperatures from /sys/class/hwmon (coretemp, k10temp, ...).
/// Returns an empty list when no CPU sensor is available (e.g. WSL).
fn hwmon_cpu_temps() -> Vec<Reading> {
    let mut readings = Vec::new();

    let Ok(entries) = std::fs::read_dir("/sys/class/hwmon") else {
        return readings;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let chip = std::fs::read_to_string(path.join("name"))
            .unwrap_or_default()
            .trim()
            .to_string();

        if !matches!(chip.as_str(), "coretemp" | "k10temp" | "zenpower" | "acpitz") {
            continue;
        }

        for i in 1..=MAX_HWMON_SENSORS {
            let Ok(raw) = std::fs::read_to_string(path.join(format!("temp{i}_input"))) else {
                continue;
            };
            let Ok(millideg) = raw.trim().parse::<f32>() else {
                continue;
            };
            let label = std::fs::read_to_string(path.join(format!("temp{i}_label")))
                .unwrap_or_default()
                .trim()
                .to_lowercase();

            if label.contains("package") || label.contains("tctl") || label.contains("tdie") {
                readings.push(Reading::new(
                    "CPU Package",
                    ReadingKind::Temperature,
                    millideg / 1000.0,
                ));
            } else if let Some(core) = label.strip_prefix("core ") {
                // hwmon numbers cores from 0; the tree numbers them from 1.
                if let Ok(n) = core.trim().parse::<u32>() {
                    readings.push(Reading::new(
                        format!("Core #{}", n + 1),
                        ReadingKind::Temperature,
                        millideg / 1000.0,
                    ));
                }
            }
        }

        if !readings.is_empty() {
            break;
        }
    }

    readings
}

// ── Memory ────────────────────────────────────────────────────────

fn memory_node(sys: &System) -> HardwareNode {
    let used_gib = sys.used_memory() as f32 / GIB as f32;
    let available_gib = sys.available_memory() as f32 / GIB as f32;

    HardwareNode::new("Generic Memory", HardwareKind::Memory)
        .with_reading(Reading::new("Memory Used", ReadingKind::Data, used_gib))
        .with_reading(Reading::new(
            "Memory Available",
            ReadingKind::Data,
            available_gib,
        ))
}

// ── GPU (NVML) ────────────────────────────────────────────────────

fn gpu_node(nvml: &nvml_wrapper::Nvml) -> Option<HardwareNode> {
    use nvml_wrapper::enum_wrappers::device::{Clock, TemperatureSensor};

    let device = nvml.device_by_index(0).ok()?;
    let name = device.name().unwrap_or_else(|_| "NVIDIA GPU".to_string());
    let mut node = HardwareNode::new(name, HardwareKind::GpuNvidia);

    if let Ok(util) = device.utilization_rates() {
        node.readings
            .push(Reading::new("GPU Core", ReadingKind::Load, util.gpu as f32));
    }
    if let Ok(memory) = device.memory_info() {
        if memory.total > 0 {
            node.readings.push(Reading::new(
                "GPU Memory",
                ReadingKind::Load,
                (memory.used as f32 / memory.total as f32) * 100.0,
            ));
        }
        node.readings.push(Reading::new(
            "GPU Memory Used",
            ReadingKind::SmallData,
            memory.used as f32 / MIB as f32,
        ));
        node.readings.push(Reading::new(
            "GPU Memory Total",
            ReadingKind::SmallData,
            memory.total as f32 / MIB as f32,
        ));
    }
    if let Ok(temp) = device.temperature(TemperatureSensor::Gpu) {
        node.readings.push(Reading::new(
            "GPU Core",
            ReadingKind::Temperature,
            temp as f32,
        ));
    }
    if let Ok(clock) = device.clock_info(Clock::Graphics) {
        node.readings
            .push(Reading::new("GPU Core", ReadingKind::Clock, clock as f32));
    }
    if let Ok(clock) = device.clock_info(Clock::Memory) {
        node.readings
            .push(Reading::new("GPU Memory", ReadingKind::Clock, clock as f32));
    }
    if let Ok(milliwatts) = device.power_usage() {
        node.readings.push(Reading::new(
            "GPU Power",
            ReadingKind::Power,
            milliwatts as f32 / 1000.0,
        ));
    }
    if let Ok(speed) = device.fan_speed(0) {
        // NVML reports fan duty as a percentage, not RPM.
        node.readings
            .push(Reading::new("GPU Fan", ReadingKind::Fan, speed as f32));
    }

    Some(node)
}

// ── Storage ───────────────────────────────────────────────────────

fn disk_nodes(
    disks: &Disks,
    disk_io: &HashMap<String, (u64, u64)>,
    prev_disk_io: &HashMap<String, (u64, u64)>,
    elapsed: f64,
) -> Vec<HardwareNode> {
    disks
        .list()
        .iter()
        .filter(|d| d.total_space() >= MIN_DISK_SIZE_BYTES)
        .map(|d| {
            let name = d.name().to_string_lossy().to_string();
            let dev_name = name.strip_prefix("/dev/").unwrap_or(&name).to_string();
            let used = d.total_space().saturating_sub(d.available_space());

            let mut node = HardwareNode::new(&name, HardwareKind::Storage).with_reading(
                Reading::new("Data Used", ReadingKind::Data, used as f32 / GIB as f32),
            );

            if let (Some(&(cur_read, cur_write)), Some(&(prev_read, prev_write))) =
                (disk_io.get(&dev_name), prev_disk_io.get(&dev_name))
            {
                let read_rate = cur_read.saturating_sub(prev_read) as f64 / elapsed;
                let write_rate = cur_write.saturating_sub(prev_write) as f64 / elapsed;
                node.readings.push(Reading::new(
                    "Read Rate",
                    ReadingKind::Throughput,
                    read_rate as f32,
                ));
                node.readings.push(Reading::new(
                    "Write Rate",
                    ReadingKind::Throughput,
                    write_rate as f32,
                ));
            }

            node
        })
        .collect()
}

/// Parse /proc/diskstats content into device → (read bytes, write bytes).
/// Skips ram, loop, and dm- devices.
fn parse_diskstats(content: &str) -> HashMap<String, (u64, u64)> {
    let mut result = HashMap::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_DISKSTATS_FIELDS {
            continue;
        }

        let name = fields[2].to_string();
        if name.starts_with("ram") || name.starts_with("loop") || name.starts_with("dm-") {
            continue;
        }

        // Field 5 = sectors read, field 9 = sectors written.
        let sectors_read: u64 = fields[5].parse().unwrap_or(0);
        let sectors_written: u64 = fields[9].parse().unwrap_or(0);
        result.insert(
            name,
            (
                sectors_read * SECTOR_SIZE_BYTES,
                sectors_written * SECTOR_SIZE_BYTES,
            ),
        );
    }

    result
}

// ── Network ───────────────────────────────────────────────────────

fn network_nodes(networks: &Networks, elapsed: f64) -> Vec<HardwareNode> {
    networks
        .iter()
        .map(|(name, data)| {
            HardwareNode::new(name.as_str(), HardwareKind::Network)
                .with_reading(Reading::new(
                    "Download Speed",
                    ReadingKind::Throughput,
                    (data.received() as f64 / elapsed) as f32,
                ))
                .with_reading(Reading::new(
                    "Upload Speed",
                    ReadingKind::Throughput,
                    (data.transmitted() as f64 / elapsed) as f32,
                ))
                .with_reading(Reading::new(
                    "Data Downloaded",
                    ReadingKind::Data,
                    data.total_received() as f32 / GIB as f32,
                ))
                .with_reading(Reading::new(
                    "Data Uploaded",
                    ReadingKind::Data,
                    data.total_transmitted() as f32 / GIB as f32,
                ))
        })
        .collect()
}

// ── Battery ───────────────────────────────────────────────────────

/// Build a battery node from a /sys/class/power_supply-style directory.
/// Returns None when no battery is present (desktops, WSL).
fn battery_node_at(dir: &Path) -> Option<HardwareNode> {
    let entries = std::fs::read_dir(dir).ok()?;

    for entry in entries.flatten() {
        let path = entry.path();
        let ps_type = std::fs::read_to_string(path.join("type"))
            .unwrap_or_default()
            .trim()
            .to_string();
        if ps_type != "Battery" {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let mut node = HardwareNode::new(name, HardwareKind::Battery);

        if let Some(percent) = read_sysfs_f32(&path, "capacity") {
            node.readings
                .push(Reading::new("Charge Level", ReadingKind::Level, percent));
        }
        // Sysfs reports energy in µWh; the tree carries Wh.
        if let Some(uwh) = read_sysfs_f32(&path, "energy_full_design") {
            node.readings.push(Reading::new(
                "Designed Capacity",
                ReadingKind::Energy,
                uwh / 1e6,
            ));
        }
        if let Some(uwh) = read_sysfs_f32(&path, "energy_full") {
            node.readings.push(Reading::new(
                "Full Charged Capacity",
                ReadingKind::Energy,
                uwh / 1e6,
            ));
        }
        if let Some(uwh) = read_sysfs_f32(&path, "energy_now") {
            node.readings.push(Reading::new(
                "Remaining Capacity",
                ReadingKind::Energy,
                uwh / 1e6,
            ));
        }

        let status = std::fs::read_to_string(path.join("status"))
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let watts = read_sysfs_f32(&path, "power_now").map(|uw| uw / 1e6).unwrap_or(0.0);
        let rate_name = if status == "discharging" {
            "Discharge Rate"
        } else {
            "Charge Rate"
        };
        node.readings
            .push(Reading::new(rate_name, ReadingKind::Power, watts));

        return Some(node);
    }

    None
}

fn read_sysfs_f32(dir: &Path, file: &str) -> Option<f32> {
    std::fs::read_to_string(dir.join(file))
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::builder;
    use crate::models::BatteryStatus;

    const SAMPLE_DISKSTATS: &str = "\
   8       0 sda 1000 0 2000 0 500 0 4000 0 0 0 0
   8       1 sda1 100 0 200 0 50 0 400 0 0 0 0
   7       0 loop0 10 0 20 0 5 0 40 0 0 0 0
 253       0 dm-0 10 0 20 0 5 0 40 0 0 0 0";

    #[test]
    fn parse_diskstats_reads_sector_counts() {
        let io = parse_diskstats(SAMPLE_DISKSTATS);
        assert_eq!(io.get("sda"), Some(&(2000 * 512, 4000 * 512)));
        assert_eq!(io.get("sda1"), Some(&(200 * 512, 400 * 512)));
    }

    #[test]
    fn parse_diskstats_skips_virtual_devices() {
        let io = parse_diskstats(SAMPLE_DISKSTATS);
        assert!(!io.contains_key("loop0"));
        assert!(!io.contains_key("dm-0"));
    }

    #[test]
    fn parse_diskstats_ignores_short_lines() {
        assert!(parse_diskstats("8 0 sda 1 2 3").is_empty());
        assert!(parse_diskstats("").is_empty());
    }

    fn write_battery_files(dir: &Path, status: &str) {
        std::fs::write(dir.join("type"), "Battery\n").unwrap();
        std::fs::write(dir.join("capacity"), "66\n").unwrap();
        std::fs::write(dir.join("energy_full_design"), "50000000\n").unwrap();
        std::fs::write(dir.join("energy_full"), "45000000\n").unwrap();
        std::fs::write(dir.join("energy_now"), "30000000\n").unwrap();
        std::fs::write(dir.join("power_now"), "8000000\n").unwrap();
        std::fs::write(dir.join("status"), status).unwrap();
    }

    #[test]
    fn battery_node_from_sysfs_discharging() {
        let tmp = tempfile::tempdir().unwrap();
        let bat = tmp.path().join("BAT0");
        std::fs::create_dir(&bat).unwrap();
        write_battery_files(&bat, "Discharging\n");

        let node = battery_node_at(tmp.path()).expect("battery node");
        assert_eq!(node.kind, HardwareKind::Battery);
        assert_eq!(node.name, "BAT0");

        let battery = builder::build(&[node]).battery.expect("battery snapshot");
        assert!(battery.is_present);
        assert_eq!(battery.status, BatteryStatus::Discharging);
        assert_eq!(battery.charge_level, 66.0);
        assert_eq!(battery.design_capacity, 50_000);
        assert_eq!(battery.full_charge_capacity, 45_000);
        assert_eq!(battery.remaining_capacity, 30_000);
        assert_eq!(battery.charge_rate, -8_000);
    }

    #[test]
    fn battery_node_charging_keeps_positive_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let bat = tmp.path().join("BAT1");
        std::fs::create_dir(&bat).unwrap();
        write_battery_files(&bat, "Charging\n");

        let node = battery_node_at(tmp.path()).unwrap();
        let battery = builder::build(&[node]).battery.unwrap();
        assert_eq!(battery.status, BatteryStatus::Charging);
        assert_eq!(battery.charge_rate, 8_000);
    }

    #[test]
    fn battery_node_ignores_mains_supplies() {
        let tmp = tempfile::tempdir().unwrap();
        let ac = tmp.path().join("AC");
        std::fs::create_dir(&ac).unwrap();
        std::fs::write(ac.join("type"), "Mains\n").unwrap();

        assert!(battery_node_at(tmp.path()).is_none());
    }

    #[test]
    fn battery_node_missing_dir_is_none() {
        assert!(battery_node_at(Path::new("/nonexistent/power_supply")).is_none());
    }

    #[tokio::test]
    async fn refresh_before_open_is_not_open() {
        let mut provider = LocalProvider::new();
        assert!(matches!(
            provider.refresh().await,
            Err(ProviderError::NotOpen)
        ));
    }
}
