//! hwstats CLI: run the monitor against a sensor source and log every
//! published update and raised alert until Ctrl+C.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hwstats::config::{Config, ProviderSource};
use hwstats::constants::MIN_UPDATE_INTERVAL_MS;
use hwstats::provider::{lhm::LhmProvider, local::LocalProvider, SensorProvider};
use hwstats::{AlertEvaluator, HardwareMonitor};

/// hwstats - hardware telemetry polling and alerting engine
#[derive(Parser, Debug)]
#[command(name = "hwstats", version, about = "Poll hardware telemetry and raise temperature alerts")]
struct Cli {
    /// Config file path (default: ~/.config/hwstats/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Sensor source (local, lhm)
    #[arg(long, short = 's', value_name = "SOURCE")]
    source: Option<String>,

    /// LibreHardwareMonitor endpoint URL (implies --source lhm)
    #[arg(long, value_name = "URL")]
    lhm_url: Option<String>,

    /// Update interval in milliseconds
    #[arg(long, short = 'i', value_name = "MS")]
    interval: Option<u64>,

    /// Disable temperature alerts
    #[arg(long)]
    no_alerts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Load and apply CLI overrides to config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let Some(ms) = cli.interval {
        config.update_interval_ms = ms.max(MIN_UPDATE_INTERVAL_MS);
    }
    if let Some(url) = &cli.lhm_url {
        config.provider.lhm_url = url.clone();
        config.provider.source = ProviderSource::Lhm;
    }
    if let Some(name) = &cli.source {
        match ProviderSource::from_name(name) {
            Some(source) => config.provider.source = source,
            None => bail!("unknown sensor source '{name}' (expected: local, lhm)"),
        }
    }
    if cli.no_alerts {
        config.alerts.enabled = false;
    }

    let provider: Box<dyn SensorProvider> = match config.provider.source {
        ProviderSource::Local => Box::new(LocalProvider::new()),
        ProviderSource::Lhm => Box::new(LhmProvider::new(&config.provider.lhm_url)),
    };

    let mut monitor = HardwareMonitor::new(
        provider,
        Duration::from_millis(config.update_interval_ms),
        config.modules,
    );

    let evaluator = AlertEvaluator::new(config.alerts.clone());
    let mut alerts_rx = evaluator.subscribe();
    tokio::spawn(evaluator.run(
        monitor.events().subscribe_cpu(),
        monitor.events().subscribe_gpu(),
        monitor.events().subscribe_sensors(),
    ));

    let mut cpu_rx = monitor.events().subscribe_cpu();
    let mut gpu_rx = monitor.events().subscribe_gpu();
    let mut memory_rx = monitor.events().subscribe_memory();
    let mut disks_rx = monitor.events().subscribe_disks();
    let mut networks_rx = monitor.events().subscribe_networks();
    let mut battery_rx = monitor.events().subscribe_battery();
    let mut sensors_rx = monitor.events().subscribe_sensors();
    let mut fans_rx = monitor.events().subscribe_fans();

    monitor.start().await?;
    info!(
        interval_ms = config.update_interval_ms,
        source = ?config.provider.source,
        "monitoring started"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down");
                break;
            }
            Ok(cpu) = cpu_rx.recv() => {
                info!(
                    name = %cpu.name,
                    load = format!("{:.1}%", cpu.total_load),
                    temp = format!("{:.1}°C", cpu.package_temperature),
                    cores = cpu.cores.len(),
                    "cpu"
                );
            }
            Ok(gpu) = gpu_rx.recv() => {
                info!(
                    name = %gpu.name,
                    load = format!("{:.1}%", gpu.core_load),
                    temp = format!("{:.1}°C", gpu.temperature),
                    "gpu"
                );
            }
            Ok(memory) = memory_rx.recv() => {
                info!(
                    used_pct = format!("{:.1}%", memory.used_percentage()),
                    used = memory.used,
                    total = memory.total,
                    "memory"
                );
            }
            Ok(disks) = disks_rx.recv() => {
                for disk in &disks {
                    info!(name = %disk.name, read = disk.read_rate, write = disk.write_rate, "disk");
                }
            }
            Ok(networks) = networks_rx.recv() => {
                for network in &networks {
                    info!(
                        adapter = %network.adapter_name,
                        down = network.download_rate,
                        up = network.upload_rate,
                        connected = network.is_connected,
                        "network"
                    );
                }
            }
            Ok(battery) = battery_rx.recv() => {
                info!(
                    level = format!("{:.0}%", battery.charge_level),
                    status = ?battery.status,
                    health = format!("{:.0}%", battery.health_percentage()),
                    "battery"
                );
            }
            Ok(sensors) = sensors_rx.recv() => {
                info!(count = sensors.len(), "sensors");
            }
            Ok(fans) = fans_rx.recv() => {
                for fan in &fans {
                    info!(name = %fan.name, rpm = format!("{:.0}", fan.current_rpm), "fan");
                }
            }
            Ok(alert) = alerts_rx.recv() => {
                warn!(
                    component = %alert.component,
                    name = %alert.name,
                    value = format!("{:.1}°C", alert.value),
                    threshold = format!("{:.1}°C", alert.threshold),
                    "temperature alert"
                );
            }
        }
    }

    if let Err(err) = tokio::time::timeout(Duration::from_secs(5), monitor.stop()).await {
        error!(error = %err, "monitor did not stop within the deadline");
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
