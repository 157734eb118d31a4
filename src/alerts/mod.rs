//! Alert evaluator: compares incoming snapshots against configured
//! temperature thresholds and raises rate-limited alerts.
//!
//! One alert key (`"<component>:<name>"`) fires at most once per cooldown
//! window. The cooldown map is owned by the evaluator task alone, so no
//! locking is needed. Emission is fire-and-forget: a missing subscriber
//! never reaches the caller, let alone the polling loop.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::AlertConfig;
use crate::constants::{ALERT_COOLDOWN_SECS, EVENT_CHANNEL_CAPACITY};
use crate::models::{CpuSnapshot, GpuSnapshot, SensorCategory, SensorReading};

/// A raised temperature alert.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureAlert {
    /// "CPU", "GPU", or the owning hardware name for generic sensors.
    pub component: String,
    /// Device or sensor name.
    pub name: String,
    /// The temperature that breached the threshold (Celsius).
    pub value: f32,
    /// The configured threshold (Celsius).
    pub threshold: f32,
    pub timestamp: DateTime<Utc>,
}

/// Threshold evaluator over CPU, GPU, and generic sensor updates.
pub struct AlertEvaluator {
    config: AlertConfig,
    cooldown: Duration,
    /// Alert key → time of the last alert raised for that key. Grows with
    /// the number of distinct physical sensors, which is bounded.
    last_alerts: HashMap<String, DateTime<Utc>>,
    alerts_tx: broadcast::Sender<TemperatureAlert>,
}

impl AlertEvaluator {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            cooldown: Duration::seconds(ALERT_COOLDOWN_SECS),
            last_alerts: HashMap::new(),
            alerts_tx: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    /// Subscribe to raised alerts. Call before spawning [`run`](Self::run).
    pub fn subscribe(&self) -> broadcast::Receiver<TemperatureAlert> {
        self.alerts_tx.subscribe()
    }

    pub fn on_cpu(&mut self, cpu: &CpuSnapshot) {
        self.on_cpu_at(cpu, Utc::now());
    }

    pub fn on_gpu(&mut self, gpu: &GpuSnapshot) {
        self.on_gpu_at(gpu, Utc::now());
    }

    pub fn on_sensors(&mut self, sensors: &[SensorReading]) {
        self.on_sensors_at(sensors, Utc::now());
    }

    fn on_cpu_at(&mut self, cpu: &CpuSnapshot, now: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }
        let threshold = self.config.cpu_temp_threshold;
        if cpu.package_temperature >= threshold {
            self.raise("CPU", &cpu.name, cpu.package_temperature, threshold, now);
        }
    }

    fn on_gpu_at(&mut self, gpu: &GpuSnapshot, now: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }
        let threshold = self.config.gpu_temp_threshold;
        if gpu.temperature >= threshold {
            self.raise("GPU", &gpu.name, gpu.temperature, threshold, now);
        }
    }

    fn on_sensors_at(&mut self, sensors: &[SensorReading], now: DateTime<Utc>) {
        if !self.config.enabled {
            return;
        }
        let threshold = self.config.general_temp_threshold;
        for sensor in sensors {
            if sensor.category != SensorCategory::Temperature {
                continue;
            }
            if sensor.value >= threshold {
                let component = sensor.hardware_name.clone();
                self.raise(&component, &sensor.name, sensor.value, threshold, now);
            }
        }
    }

    /// Emit one alert unless the key is still cooling down.
    fn raise(&mut self, component: &str, name: &str, value: f32, threshold: f32, now: DateTime<Utc>) {
        let key = format!("{component}:{name}");

        if let Some(last) = self.last_alerts.get(&key) {
            if now - *last < self.cooldown {
                return;
            }
        }
        self.last_alerts.insert(key, now);

        // No subscribers is fine; the alert is simply unobserved.
        let _ = self.alerts_tx.send(TemperatureAlert {
            component: component.to_string(),
            name: name.to_string(),
            value,
            threshold,
            timestamp: now,
        });
    }

    /// Consume update streams until their senders are gone (monitor stopped
    /// and dropped). Lagged receivers skip ahead rather than erroring out.
    pub async fn run(
        mut self,
        mut cpu_rx: broadcast::Receiver<CpuSnapshot>,
        mut gpu_rx: broadcast::Receiver<GpuSnapshot>,
        mut sensors_rx: broadcast::Receiver<Vec<SensorReading>>,
    ) {
        use broadcast::error::RecvError;

        loop {
            tokio::select! {
                result = cpu_rx.recv() => match result {
                    Ok(cpu) => self.on_cpu(&cpu),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "cpu updates lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                result = gpu_rx.recv() => match result {
                    Ok(gpu) => self.on_gpu(&gpu),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "gpu updates lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                result = sensors_rx.recv() => match result {
                    Ok(sensors) => self.on_sensors(&sensors),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "sensor updates lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }
}
