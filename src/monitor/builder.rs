//! Snapshot Builder: turns one refreshed hardware tree into the normalized
//! per-category snapshots for a single tick.
//!
//! Pure classification logic: no I/O, no timers. Malformed or missing data
//! never fails a build: absent categories stay `None`/empty and missing
//! values degrade to 0. Name matching is case-sensitive and follows a fixed
//! precedence per category; for scalar fields the last matching reading
//! wins.

use chrono::Utc;

use crate::constants::{GIB, MIB, WH_TO_MWH};
use crate::models::{
    BatterySnapshot, BatteryStatus, CoreReading, CpuSnapshot, DiskSnapshot, FanReading,
    GpuSnapshot, GpuVendor, HardwareKind, HardwareNode, MemorySnapshot, NetworkSnapshot,
    ReadingKind, SensorReading, SnapshotSet,
};

/// Classify one refreshed hardware tree into a full snapshot set.
pub fn build(roots: &[HardwareNode]) -> SnapshotSet {
    let mut set = SnapshotSet::default();
    for node in roots {
        visit(node, &mut set);
    }
    set
}

/// Dispatch a node to its category handler, then recurse into children.
/// A child's category may differ from its parent's (e.g. a super-IO chip
/// embedded in a motherboard).
fn visit(node: &HardwareNode, set: &mut SnapshotSet) {
    match node.kind {
        HardwareKind::Cpu => {
            set.cpu = Some(classify_cpu(node));
            collect_sensors(node, set);
        }
        HardwareKind::GpuNvidia | HardwareKind::GpuAmd | HardwareKind::GpuIntel => {
            set.gpu = Some(classify_gpu(node));
            collect_sensors(node, set);
        }
        HardwareKind::Memory => {
            set.memory = Some(classify_memory(node));
        }
        HardwareKind::Storage => {
            set.disks.push(classify_storage(node));
            collect_sensors(node, set);
        }
        HardwareKind::Network => {
            set.networks.push(classify_network(node));
        }
        HardwareKind::Battery => {
            set.battery = Some(classify_battery(node));
        }
        HardwareKind::Motherboard | HardwareKind::SuperIo | HardwareKind::EmbeddedController => {
            collect_sensors(node, set);
        }
        HardwareKind::Other => {}
    }

    for child in &node.children {
        visit(child, set);
    }
}

// ── CPU ───────────────────────────────────────────────────────────

fn classify_cpu(cpu: &HardwareNode) -> CpuSnapshot {
    let mut total_load = 0.0;
    let mut package_temp = 0.0;
    let mut package_power = 0.0;
    let mut cores: Vec<CoreReading> = Vec::new();

    // First pass: scalars, plus one core entry per distinct
    // "CPU Core #<n>" load reading (first occurrence wins).
    for reading in &cpu.readings {
        let value = reading.value_or_zero();
        match reading.kind {
            ReadingKind::Load if reading.name == "CPU Total" => total_load = value,
            ReadingKind::Temperature
                if reading.name.contains("Package") || reading.name.contains("Average") =>
            {
                package_temp = value;
            }
            ReadingKind::Power if reading.name.contains("Package") => package_power = value,
            ReadingKind::Load => {
                if let Some(id) = reading
                    .name
                    .strip_prefix("CPU Core #")
                    .and_then(|rest| rest.parse::<u32>().ok())
                {
                    if !cores.iter().any(|c| c.core_id == id) {
                        cores.push(CoreReading {
                            core_id: id,
                            load: value,
                            temperature: 0.0,
                            clock: 0.0,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    // Second pass: merge temperature/clock readings into the seeded cores.
    // Readings for ids without a load entry are dropped.
    for reading in &cpu.readings {
        if !(reading.name.starts_with("Core #") || reading.name.starts_with("CPU Core #")) {
            continue;
        }
        let Some(id) = first_digit_run(&reading.name) else {
            continue;
        };
        if let Some(core) = cores.iter_mut().find(|c| c.core_id == id) {
            match reading.kind {
                ReadingKind::Temperature => core.temperature = reading.value_or_zero(),
                ReadingKind::Clock => core.clock = reading.value_or_zero(),
                _ => {}
            }
        }
    }

    cores.sort_by_key(|c| c.core_id);

    CpuSnapshot {
        name: cpu.name.clone(),
        total_load,
        package_temperature: package_temp,
        package_power,
        cores,
        timestamp: Utc::now(),
    }
}

/// Extract the first contiguous digit run of a name ("Core #12 Distance
/// to TjMax" → 12).
fn first_digit_run(name: &str) -> Option<u32> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ── GPU ───────────────────────────────────────────────────────────

fn classify_gpu(gpu: &HardwareNode) -> GpuSnapshot {
    let vendor = match gpu.kind {
        HardwareKind::GpuNvidia => GpuVendor::Nvidia,
        HardwareKind::GpuAmd => GpuVendor::Amd,
        HardwareKind::GpuIntel => GpuVendor::Intel,
        _ => GpuVendor::Unknown,
    };

    let mut snapshot = GpuSnapshot {
        name: gpu.name.clone(),
        vendor,
        core_load: 0.0,
        memory_load: 0.0,
        temperature: 0.0,
        core_clock: 0.0,
        memory_clock: 0.0,
        memory_used: 0,
        memory_total: 0,
        power: 0.0,
        fan_speed: 0.0,
        timestamp: Utc::now(),
    };

    for reading in &gpu.readings {
        let value = reading.value_or_zero();
        match reading.kind {
            ReadingKind::Load if reading.name.contains("Core") => snapshot.core_load = value,
            ReadingKind::Load if reading.name.contains("Memory") => snapshot.memory_load = value,
            ReadingKind::Temperature
                if reading.name.contains("Core") || reading.name == "GPU Core" =>
            {
                snapshot.temperature = value;
            }
            ReadingKind::Clock if reading.name.contains("Core") => snapshot.core_clock = value,
            ReadingKind::Clock if reading.name.contains("Memory") => snapshot.memory_clock = value,
            ReadingKind::Power if reading.name.contains("GPU") || reading.name == "Power" => {
                snapshot.power = value;
            }
            ReadingKind::Fan => snapshot.fan_speed = value,
            ReadingKind::SmallData if reading.name.contains("Used") => {
                snapshot.memory_used = (value * MIB as f32) as u64;
            }
            ReadingKind::SmallData if reading.name.contains("Total") => {
                snapshot.memory_total = (value * MIB as f32) as u64;
            }
            _ => {}
        }
    }

    snapshot
}

// ── Memory ────────────────────────────────────────────────────────

fn classify_memory(memory: &HardwareNode) -> MemorySnapshot {
    let mut used_gib = 0.0;
    let mut available_gib = 0.0;

    for reading in &memory.readings {
        match reading.kind {
            ReadingKind::Data if reading.name == "Memory Used" => {
                used_gib = reading.value_or_zero();
            }
            ReadingKind::Data if reading.name == "Memory Available" => {
                available_gib = reading.value_or_zero();
            }
            _ => {}
        }
    }

    // The provider reports no independent total; it is the sum.
    MemorySnapshot {
        used: (used_gib * GIB as f32) as u64,
        available: (available_gib * GIB as f32) as u64,
        total: ((used_gib + available_gib) * GIB as f32) as u64,
        timestamp: Utc::now(),
    }
}

// ── Storage ───────────────────────────────────────────────────────

fn classify_storage(storage: &HardwareNode) -> DiskSnapshot {
    let mut disk = DiskSnapshot {
        name: storage.name.clone(),
        drive_letter: String::new(),
        read_rate: 0,
        write_rate: 0,
        used_space: 0,
        // Known gap: this provider path never reports total space, so
        // usage_percentage stays 0. Kept as-is rather than inventing a
        // second data source.
        total_space: 0,
        temperature: 0.0,
        timestamp: Utc::now(),
    };

    for reading in &storage.readings {
        let value = reading.value_or_zero();
        match reading.kind {
            ReadingKind::Throughput if reading.name.contains("Read") => {
                disk.read_rate = value as u64;
            }
            ReadingKind::Throughput if reading.name.contains("Write") => {
                disk.write_rate = value as u64;
            }
            ReadingKind::Temperature => disk.temperature = value,
            ReadingKind::Data if reading.name.contains("Used") => {
                disk.used_space = (value * GIB as f32) as u64;
            }
            _ => {}
        }
    }

    disk
}

// ── Network ───────────────────────────────────────────────────────

fn classify_network(network: &HardwareNode) -> NetworkSnapshot {
    let mut download_rate = 0u64;
    let mut upload_rate = 0u64;
    let mut total_downloaded = 0u64;
    let mut total_uploaded = 0u64;

    for reading in &network.readings {
        let value = reading.value_or_zero();
        match reading.kind {
            ReadingKind::Throughput if reading.name.contains("Download") => {
                download_rate = value as u64;
            }
            ReadingKind::Throughput if reading.name.contains("Upload") => {
                upload_rate = value as u64;
            }
            ReadingKind::Data if reading.name.contains("Downloaded") => {
                total_downloaded = (value * GIB as f32) as u64;
            }
            ReadingKind::Data if reading.name.contains("Uploaded") => {
                total_uploaded = (value * GIB as f32) as u64;
            }
            _ => {}
        }
    }

    NetworkSnapshot {
        adapter_name: network.name.clone(),
        download_rate,
        upload_rate,
        total_downloaded,
        total_uploaded,
        is_connected: download_rate > 0 || upload_rate > 0,
        timestamp: Utc::now(),
    }
}

// ── Battery ───────────────────────────────────────────────────────

fn classify_battery(battery: &HardwareNode) -> BatterySnapshot {
    let mut charge_level = 0.0;
    let mut design_capacity = 0;
    let mut full_charge_capacity = 0;
    let mut remaining_capacity = 0;
    let mut charge_rate = 0;

    for reading in &battery.readings {
        let value = reading.value_or_zero();
        match reading.kind {
            ReadingKind::Level if reading.name.contains("Charge") => charge_level = value,
            ReadingKind::Energy if reading.name.contains("Designed") => {
                design_capacity = (value * WH_TO_MWH) as i32;
            }
            ReadingKind::Energy if reading.name.contains("Full") => {
                full_charge_capacity = (value * WH_TO_MWH) as i32;
            }
            ReadingKind::Energy if reading.name.contains("Remaining") => {
                remaining_capacity = (value * WH_TO_MWH) as i32;
            }
            ReadingKind::Power
                if reading.name.contains("Charge") || reading.name.contains("Discharge") =>
            {
                charge_rate = (value * WH_TO_MWH) as i32;
                if reading.name.contains("Discharge") {
                    charge_rate = -charge_rate;
                }
            }
            _ => {}
        }
    }

    let status = if charge_rate > 0 {
        BatteryStatus::Charging
    } else if charge_rate < 0 {
        BatteryStatus::Discharging
    } else if charge_level > 0.0 {
        BatteryStatus::Idle
    } else {
        BatteryStatus::NotPresent
    };

    BatterySnapshot {
        is_present: status != BatteryStatus::NotPresent,
        charge_level,
        status,
        design_capacity,
        full_charge_capacity,
        remaining_capacity,
        charge_rate,
        time_remaining: None,
        timestamp: Utc::now(),
    }
}

// ── Generic sensors / fans ────────────────────────────────────────

/// Emit every classifiable reading of this node as a generic sensor, and
/// every fan reading additionally as a fan entry. Readings with unmapped
/// kinds are skipped.
fn collect_sensors(node: &HardwareNode, set: &mut SnapshotSet) {
    for reading in &node.readings {
        let Some(category) = reading.kind.category() else {
            continue;
        };

        set.sensors.push(SensorReading {
            name: reading.name.clone(),
            hardware_name: node.name.clone(),
            category,
            value: reading.value_or_zero(),
            min: reading.min,
            max: reading.max,
            timestamp: Utc::now(),
        });

        if reading.kind == ReadingKind::Fan {
            set.fans.push(FanReading {
                name: format!("{} - {}", node.name, reading.name),
                current_rpm: reading.value_or_zero(),
                target_rpm: None,
                speed_percentage: None,
                is_controllable: false,
                timestamp: Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reading, SensorCategory};

    fn load(name: &str, value: f32) -> Reading {
        Reading::new(name, ReadingKind::Load, value)
    }

    fn temp(name: &str, value: f32) -> Reading {
        Reading::new(name, ReadingKind::Temperature, value)
    }

    fn clock(name: &str, value: f32) -> Reading {
        Reading::new(name, ReadingKind::Clock, value)
    }

    fn sample_cpu() -> HardwareNode {
        HardwareNode::new("AMD Ryzen 9 5900X", HardwareKind::Cpu)
            .with_reading(load("CPU Total", 42.5))
            .with_reading(temp("CPU Package", 67.0))
            .with_reading(Reading::new("CPU Package", ReadingKind::Power, 88.0))
            .with_reading(load("CPU Core #2", 75.0))
            .with_reading(load("CPU Core #1", 50.0))
            .with_reading(temp("Core #1", 65.0))
            .with_reading(temp("Core #2", 68.0))
            .with_reading(clock("CPU Core #1", 3600.0))
            .with_reading(clock("CPU Core #2", 3800.0))
    }

    #[test]
    fn cpu_scalars_and_cores_assembled() {
        let set = build(&[sample_cpu()]);
        let cpu = set.cpu.expect("cpu snapshot");

        assert_eq!(cpu.name, "AMD Ryzen 9 5900X");
        assert_eq!(cpu.total_load, 42.5);
        assert_eq!(cpu.package_temperature, 67.0);
        assert_eq!(cpu.package_power, 88.0);

        assert_eq!(cpu.cores.len(), 2);
        assert_eq!(cpu.cores[0].core_id, 1);
        assert_eq!(cpu.cores[0].load, 50.0);
        assert_eq!(cpu.cores[0].temperature, 65.0);
        assert_eq!(cpu.cores[0].clock, 3600.0);
        assert_eq!(cpu.cores[1].core_id, 2);
        assert_eq!(cpu.cores[1].load, 75.0);
        assert_eq!(cpu.cores[1].temperature, 68.0);
        assert_eq!(cpu.cores[1].clock, 3800.0);
    }

    #[test]
    fn cpu_cores_sorted_ascending_regardless_of_reading_order() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(load("CPU Core #10", 10.0))
            .with_reading(load("CPU Core #2", 2.0))
            .with_reading(load("CPU Core #1", 1.0));
        let cpu = build(&[node]).cpu.unwrap();
        let ids: Vec<u32> = cpu.cores.iter().map(|c| c.core_id).collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[test]
    fn cpu_duplicate_core_load_first_occurrence_wins() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(load("CPU Core #1", 30.0))
            .with_reading(load("CPU Core #1", 99.0));
        let cpu = build(&[node]).cpu.unwrap();
        assert_eq!(cpu.cores.len(), 1);
        assert_eq!(cpu.cores[0].load, 30.0);
    }

    #[test]
    fn cpu_temperature_without_load_entry_is_dropped() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(load("CPU Core #1", 12.0))
            .with_reading(temp("Core #5", 70.0));
        let cpu = build(&[node]).cpu.unwrap();
        assert_eq!(cpu.cores.len(), 1);
        assert_eq!(cpu.cores[0].core_id, 1);
        assert_eq!(cpu.cores[0].temperature, 0.0);
    }

    #[test]
    fn cpu_average_temperature_matches_package_slot() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(temp("Core Average", 61.5));
        let cpu = build(&[node]).cpu.unwrap();
        assert_eq!(cpu.package_temperature, 61.5);
    }

    #[test]
    fn cpu_malformed_core_suffix_is_skipped() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(load("CPU Core #1 SMT", 40.0))
            .with_reading(load("CPU Core #3", 20.0));
        let cpu = build(&[node]).cpu.unwrap();
        assert_eq!(cpu.cores.len(), 1);
        assert_eq!(cpu.cores[0].core_id, 3);
    }

    #[test]
    fn cpu_core_temp_with_name_suffix_merges_by_digit_run() {
        let node = HardwareNode::new("cpu", HardwareKind::Cpu)
            .with_reading(load("CPU Core #2", 20.0))
            .with_reading(temp("Core #2 Distance to TjMax", 55.0));
        let cpu = build(&[node]).cpu.unwrap();
        assert_eq!(cpu.cores[0].temperature, 55.0);
    }

    fn sample_gpu() -> HardwareNode {
        HardwareNode::new("NVIDIA GeForce RTX 3080", HardwareKind::GpuNvidia)
            .with_reading(load("GPU Core", 96.0))
            .with_reading(load("GPU Memory", 54.0))
            .with_reading(temp("GPU Core", 71.0))
            .with_reading(clock("GPU Core", 1850.0))
            .with_reading(clock("GPU Memory", 9500.0))
            .with_reading(Reading::new("GPU Power", ReadingKind::Power, 310.0))
            .with_reading(Reading::new("GPU Fan", ReadingKind::Fan, 1650.0))
            .with_reading(Reading::new(
                "GPU Memory Used",
                ReadingKind::SmallData,
                2048.0,
            ))
            .with_reading(Reading::new(
                "GPU Memory Total",
                ReadingKind::SmallData,
                10240.0,
            ))
    }

    #[test]
    fn gpu_full_classification() {
        let set = build(&[sample_gpu()]);
        let gpu = set.gpu.expect("gpu snapshot");

        assert_eq!(gpu.vendor, GpuVendor::Nvidia);
        assert_eq!(gpu.core_load, 96.0);
        assert_eq!(gpu.memory_load, 54.0);
        assert_eq!(gpu.temperature, 71.0);
        assert_eq!(gpu.core_clock, 1850.0);
        assert_eq!(gpu.memory_clock, 9500.0);
        assert_eq!(gpu.power, 310.0);
        assert_eq!(gpu.fan_speed, 1650.0);
        assert_eq!(gpu.memory_used, 2048 * 1024 * 1024);
        assert_eq!(gpu.memory_total, 10240 * 1024 * 1024);
    }

    #[test]
    fn gpu_vendor_follows_hardware_kind() {
        let amd = HardwareNode::new("Radeon RX 6800", HardwareKind::GpuAmd);
        let intel = HardwareNode::new("Arc A770", HardwareKind::GpuIntel);
        assert_eq!(build(&[amd]).gpu.unwrap().vendor, GpuVendor::Amd);
        assert_eq!(build(&[intel]).gpu.unwrap().vendor, GpuVendor::Intel);
    }

    #[test]
    fn gpu_last_matching_reading_wins() {
        let node = HardwareNode::new("gpu", HardwareKind::GpuNvidia)
            .with_reading(temp("GPU Core", 60.0))
            .with_reading(temp("GPU Core", 62.0));
        assert_eq!(build(&[node]).gpu.unwrap().temperature, 62.0);
    }

    #[test]
    fn memory_gib_conversion_and_total() {
        let node = HardwareNode::new("Generic Memory", HardwareKind::Memory)
            .with_reading(Reading::new("Memory Used", ReadingKind::Data, 8.0))
            .with_reading(Reading::new("Memory Available", ReadingKind::Data, 8.0));
        let memory = build(&[node]).memory.expect("memory snapshot");

        assert_eq!(memory.used, 8 * 1_073_741_824);
        assert_eq!(memory.available, 8 * 1_073_741_824);
        assert_eq!(memory.total, 16 * 1_073_741_824);
        assert_eq!(memory.used_percentage(), 50.0);
    }

    #[test]
    fn memory_ignores_inexact_names() {
        let node = HardwareNode::new("mem", HardwareKind::Memory)
            .with_reading(Reading::new("Virtual Memory Used", ReadingKind::Data, 4.0));
        let memory = build(&[node]).memory.unwrap();
        assert_eq!(memory.used, 0);
    }

    #[test]
    fn storage_rates_temperature_and_used_space() {
        let node = HardwareNode::new("Samsung SSD 970", HardwareKind::Storage)
            .with_reading(Reading::new("Read Rate", ReadingKind::Throughput, 1024.0))
            .with_reading(Reading::new("Write Rate", ReadingKind::Throughput, 2048.0))
            .with_reading(temp("Temperature", 42.0))
            .with_reading(Reading::new("Data Used", ReadingKind::Data, 250.0));
        let set = build(&[node]);
        assert_eq!(set.disks.len(), 1);
        let disk = &set.disks[0];

        assert_eq!(disk.read_rate, 1024);
        assert_eq!(disk.write_rate, 2048);
        assert_eq!(disk.temperature, 42.0);
        assert_eq!(disk.used_space, 250 * 1_073_741_824);
        // Total space is never populated by this provider path.
        assert_eq!(disk.total_space, 0);
        assert_eq!(disk.usage_percentage(), 0.0);
    }

    #[test]
    fn network_rates_and_connected_flag() {
        let up = HardwareNode::new("Ethernet", HardwareKind::Network)
            .with_reading(Reading::new(
                "Download Speed",
                ReadingKind::Throughput,
                1_000_000.0,
            ))
            .with_reading(Reading::new("Upload Speed", ReadingKind::Throughput, 0.0))
            .with_reading(Reading::new("Data Downloaded", ReadingKind::Data, 2.0))
            .with_reading(Reading::new("Data Uploaded", ReadingKind::Data, 1.0));
        let idle = HardwareNode::new("Wi-Fi", HardwareKind::Network)
            .with_reading(Reading::new("Download Speed", ReadingKind::Throughput, 0.0))
            .with_reading(Reading::new("Data Downloaded", ReadingKind::Data, 5.0));

        let set = build(&[up, idle]);
        assert_eq!(set.networks.len(), 2);

        assert_eq!(set.networks[0].download_rate, 1_000_000);
        assert_eq!(set.networks[0].total_downloaded, 2 * 1_073_741_824);
        assert_eq!(set.networks[0].total_uploaded, 1_073_741_824);
        assert!(set.networks[0].is_connected);

        // Cumulative traffic alone does not make an adapter connected.
        assert!(!set.networks[1].is_connected);
    }

    fn battery_node(level: f32, rate_name: &str, rate: f32) -> HardwareNode {
        HardwareNode::new("BAT0", HardwareKind::Battery)
            .with_reading(Reading::new("Charge Level", ReadingKind::Level, level))
            .with_reading(Reading::new("Designed Capacity", ReadingKind::Energy, 50.0))
            .with_reading(Reading::new(
                "Full Charged Capacity",
                ReadingKind::Energy,
                45.0,
            ))
            .with_reading(Reading::new("Remaining Capacity", ReadingKind::Energy, 30.0))
            .with_reading(Reading::new(rate_name, ReadingKind::Power, rate))
    }

    #[test]
    fn battery_charging_status_and_capacities() {
        let battery = build(&[battery_node(66.0, "Charge Rate", 12.5)])
            .battery
            .expect("battery snapshot");

        assert!(battery.is_present);
        assert_eq!(battery.status, BatteryStatus::Charging);
        assert_eq!(battery.charge_level, 66.0);
        assert_eq!(battery.design_capacity, 50_000);
        assert_eq!(battery.full_charge_capacity, 45_000);
        assert_eq!(battery.remaining_capacity, 30_000);
        assert_eq!(battery.charge_rate, 12_500);
        assert_eq!(battery.health_percentage(), 90.0);
    }

    #[test]
    fn battery_discharge_rate_is_negated() {
        let battery = build(&[battery_node(66.0, "Discharge Rate", 8.0)])
            .battery
            .unwrap();
        assert_eq!(battery.charge_rate, -8_000);
        assert_eq!(battery.status, BatteryStatus::Discharging);
    }

    #[test]
    fn battery_zero_rate_with_level_is_idle() {
        let battery = build(&[battery_node(40.0, "Charge Rate", 0.0)])
            .battery
            .unwrap();
        assert_eq!(battery.status, BatteryStatus::Idle);
        assert!(battery.is_present);
    }

    #[test]
    fn battery_zero_rate_and_level_is_not_present() {
        let battery = build(&[battery_node(0.0, "Charge Rate", 0.0)])
            .battery
            .unwrap();
        assert_eq!(battery.status, BatteryStatus::NotPresent);
        assert!(!battery.is_present);
    }

    #[test]
    fn sensors_collected_from_motherboard_with_fans() {
        let node = HardwareNode::new("ASUS PRIME X570", HardwareKind::Motherboard)
            .with_reading(temp("System", 38.0))
            .with_reading(Reading::new("Chassis Fan #1", ReadingKind::Fan, 900.0))
            .with_reading(Reading::new("VBAT", ReadingKind::Voltage, 3.2))
            // Control readings have no category and must be dropped.
            .with_reading(Reading::new("Fan Control #1", ReadingKind::Control, 45.0));

        let set = build(&[node]);
        assert_eq!(set.sensors.len(), 3);
        assert_eq!(set.sensors[0].hardware_name, "ASUS PRIME X570");
        assert_eq!(set.sensors[0].category, SensorCategory::Temperature);
        assert_eq!(set.sensors[0].unit(), "°C");
        assert_eq!(set.sensors[1].unit(), "RPM");
        assert_eq!(set.sensors[2].unit(), "V");

        assert_eq!(set.fans.len(), 1);
        assert_eq!(set.fans[0].name, "ASUS PRIME X570 - Chassis Fan #1");
        assert_eq!(set.fans[0].current_rpm, 900.0);
        assert!(!set.fans[0].is_controllable);
        assert!(set.fans[0].target_rpm.is_none());
    }

    #[test]
    fn sensor_min_max_carried_through() {
        let mut reading = temp("System", 38.0);
        reading.min = Some(30.0);
        reading.max = Some(51.0);
        let node = HardwareNode::new("board", HardwareKind::Motherboard).with_reading(reading);

        let set = build(&[node]);
        assert_eq!(set.sensors[0].min, Some(30.0));
        assert_eq!(set.sensors[0].max, Some(51.0));
    }

    #[test]
    fn sub_nodes_are_visited_with_their_own_category() {
        let super_io = HardwareNode::new("Nuvoton NCT6798D", HardwareKind::SuperIo)
            .with_reading(Reading::new("Fan #2", ReadingKind::Fan, 1200.0));
        let board =
            HardwareNode::new("ASUS PRIME X570", HardwareKind::Motherboard).with_child(super_io);

        let set = build(&[board]);
        assert_eq!(set.fans.len(), 1);
        assert_eq!(set.fans[0].name, "Nuvoton NCT6798D - Fan #2");
    }

    #[test]
    fn unknown_hardware_readings_ignored_but_children_visited() {
        let child = HardwareNode::new("Embedded", HardwareKind::EmbeddedController)
            .with_reading(temp("EC Temp", 44.0));
        let node = HardwareNode::new("Mystery Device", HardwareKind::Other)
            .with_reading(temp("Hidden", 99.0))
            .with_child(child);

        let set = build(&[node]);
        assert_eq!(set.sensors.len(), 1);
        assert_eq!(set.sensors[0].name, "EC Temp");
    }

    #[test]
    fn empty_tree_builds_empty_set() {
        let set = build(&[]);
        assert!(set.cpu.is_none());
        assert!(set.gpu.is_none());
        assert!(set.memory.is_none());
        assert!(set.disks.is_empty());
        assert!(set.networks.is_empty());
        assert!(set.battery.is_none());
        assert!(set.sensors.is_empty());
        assert!(set.fans.is_empty());
    }

    #[test]
    fn missing_reading_values_default_to_zero() {
        let mut reading = load("CPU Total", 0.0);
        reading.value = None;
        let node = HardwareNode::new("cpu", HardwareKind::Cpu).with_reading(reading);
        assert_eq!(build(&[node]).cpu.unwrap().total_load, 0.0);
    }

    #[test]
    fn identical_trees_classify_identically_except_timestamps() {
        let roots = vec![sample_cpu(), sample_gpu()];
        let first = build(&roots);
        let second = build(&roots);

        let (a, b) = (first.cpu.unwrap(), second.cpu.unwrap());
        assert_eq!(a.name, b.name);
        assert_eq!(a.total_load, b.total_load);
        assert_eq!(a.package_temperature, b.package_temperature);
        assert_eq!(a.package_power, b.package_power);
        assert_eq!(a.cores, b.cores);

        let (g, h) = (first.gpu.unwrap(), second.gpu.unwrap());
        assert_eq!(g.core_load, h.core_load);
        assert_eq!(g.memory_used, h.memory_used);
        assert_eq!(g.fan_speed, h.fan_speed);
    }
}
