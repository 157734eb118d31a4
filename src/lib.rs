//! # hwstats - Hardware Telemetry Engine
//!
//! Polls a platform sensor provider at a configurable cadence, normalizes
//! the provider's heterogeneous hardware tree into typed per-category
//! snapshots (CPU, GPU, memory, disks, networks, battery, sensors, fans),
//! and broadcasts one update per category per tick. A threshold evaluator
//! layered on top raises rate-limited temperature alerts.
//!
//! The UI shell, tray, widgets, and settings persistence are external
//! consumers: they subscribe to the event bus and feed back a small
//! settings surface (interval, enable flags, thresholds).

pub mod alerts;
pub mod config;
pub mod constants;
pub mod models;
pub mod monitor;
pub mod provider;

pub use alerts::{AlertEvaluator, TemperatureAlert};
pub use config::{AlertConfig, Config, ModuleToggles, ProviderSource};
pub use monitor::{EventBus, HardwareMonitor, MonitorState};
pub use provider::{ProviderError, SensorProvider};
