//! Provider-side hardware tree types.
//!
//! A sensor provider exposes one tree per physical component: a
//! [`HardwareNode`] carries its own typed readings plus nested sub-nodes
//! (e.g. an embedded controller hanging off a motherboard). Reading kinds
//! are a closed set; the mapping from kind to sensor category and unit is
//! an explicit table rather than ad-hoc string conventions.

use crate::models::SensorCategory;

/// Hardware category reported by the provider for one tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareKind {
    Cpu,
    GpuNvidia,
    GpuAmd,
    GpuIntel,
    Memory,
    Storage,
    Network,
    Battery,
    Motherboard,
    SuperIo,
    EmbeddedController,
    /// Anything the provider cannot categorize. Its own readings are ignored,
    /// but its children are still visited.
    Other,
}

/// The kind of a single sensor reading, as reported by the provider.
///
/// Mirrors the sensor taxonomy of LibreHardwareMonitor-style providers.
/// Only a subset maps to a [`SensorCategory`]; the rest exist so that
/// providers can report them and the classifier can skip them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Voltage,
    Current,
    Clock,
    Temperature,
    Load,
    Fan,
    Control,
    Level,
    Factor,
    Power,
    Data,
    SmallData,
    Throughput,
    Energy,
}

impl ReadingKind {
    /// Classification table: reading kind → generic sensor category.
    ///
    /// Kinds returning `None` never appear in the generic sensor list
    /// (they are still consumed by category-specific handlers, e.g.
    /// `Level` by the battery handler and `SmallData` by the GPU handler).
    pub fn category(self) -> Option<SensorCategory> {
        match self {
            ReadingKind::Temperature => Some(SensorCategory::Temperature),
            ReadingKind::Voltage => Some(SensorCategory::Voltage),
            ReadingKind::Power => Some(SensorCategory::Power),
            ReadingKind::Fan => Some(SensorCategory::Fan),
            ReadingKind::Clock => Some(SensorCategory::Clock),
            ReadingKind::Load => Some(SensorCategory::Load),
            ReadingKind::Data => Some(SensorCategory::Data),
            ReadingKind::Throughput => Some(SensorCategory::Throughput),
            ReadingKind::Current
            | ReadingKind::Control
            | ReadingKind::Level
            | ReadingKind::Factor
            | ReadingKind::SmallData
            | ReadingKind::Energy => None,
        }
    }
}

/// One named, typed numeric value exposed by a hardware node.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub name: String,
    pub kind: ReadingKind,
    /// Current value. Providers report `None` for sensors that exist but
    /// have not produced a sample yet; classification treats that as 0.
    pub value: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl Reading {
    /// Convenience constructor for a reading with a present value.
    pub fn new(name: impl Into<String>, kind: ReadingKind, value: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            value: Some(value),
            min: None,
            max: None,
        }
    }

    /// The value with the missing-data default applied.
    pub fn value_or_zero(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}

/// One node of the provider's hardware tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareNode {
    pub name: String,
    pub kind: HardwareKind,
    pub readings: Vec<Reading>,
    pub children: Vec<HardwareNode>,
}

impl HardwareNode {
    pub fn new(name: impl Into<String>, kind: HardwareKind) -> Self {
        Self {
            name: name.into(),
            kind,
            readings: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style helper: append a reading.
    pub fn with_reading(mut self, reading: Reading) -> Self {
        self.readings.push(reading);
        self
    }

    /// Builder-style helper: append a child node.
    pub fn with_child(mut self, child: HardwareNode) -> Self {
        self.children.push(child);
        self
    }
}
