//! LibreHardwareMonitor HTTP JSON provider.
//!
//! LHM exposes a recursive tree of hardware → sensor groups → sensors at
//! `/data.json`. This provider polls that endpoint and converts the display
//! tree into typed [`HardwareNode`]s: the hardware kind comes from the node
//! icon, the reading kind from the enclosing sensor-group node, and numeric
//! values are parsed out of display strings like "65,3 °C" or "1200 RPM".

use async_trait::async_trait;
use serde::Deserialize;

use crate::constants::LHM_HTTP_TIMEOUT_SECS;
use crate::models::{HardwareKind, HardwareNode, Reading, ReadingKind};
use crate::provider::{ProviderError, SensorProvider};

/// Raw LHM tree node. The JSON is recursive: each node can have `Children`
/// containing more nodes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LhmNode {
    /// Display text, e.g. "Intel Core i7-10700K" or "CPU Core #1: 65.0 °C".
    #[serde(default)]
    text: String,
    #[serde(default)]
    children: Vec<LhmNode>,
    #[serde(default)]
    min: String,
    #[serde(default)]
    max: String,
    /// Current value display string; empty for non-sensor nodes.
    #[serde(default)]
    value: String,
    /// Icon path; identifies hardware nodes ("images/cpu.png", ...).
    #[serde(default, rename = "ImageURL")]
    image_url: String,
}

/// Provider backed by a LibreHardwareMonitor HTTP endpoint.
pub struct LhmProvider {
    url: String,
    client: Option<reqwest::Client>,
}

impl LhmProvider {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: None,
        }
    }

    async fn fetch(&self) -> Result<String, ProviderError> {
        let client = self.client.as_ref().ok_or(ProviderError::NotOpen)?;
        let resp = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ProviderError::Unreachable(format!(
                "{} returned {}",
                self.url,
                resp.status()
            )));
        }
        resp.text()
            .await
            .map_err(|e| ProviderError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl SensorProvider for LhmProvider {
    async fn open(&mut self) -> Result<(), ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LHM_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;
        self.client = Some(client);
        // Probe once so an unreachable endpoint fails the start instead of
        // silently skipping every tick.
        self.fetch().await?;
        Ok(())
    }

    async fn refresh(&mut self) -> Result<Vec<HardwareNode>, ProviderError> {
        let text = self.fetch().await?;
        parse_tree(&text)
    }

    fn close(&mut self) {
        self.client = None;
    }
}

/// Parse the LHM JSON document into hardware trees.
pub fn parse_tree(json_str: &str) -> Result<Vec<HardwareNode>, ProviderError> {
    let root: LhmNode =
        serde_json::from_str(json_str).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let mut roots = Vec::new();
    collect_hardware(&root, &mut roots);
    Ok(roots)
}

/// Walk down until hardware nodes are found; everything above them
/// (the root "Sensor" node, the machine-name node) is a plain container.
fn collect_hardware(node: &LhmNode, out: &mut Vec<HardwareNode>) {
    if let Some(kind) = hardware_kind(&node.image_url) {
        out.push(convert_hardware(node, kind));
        return;
    }
    for child in &node.children {
        collect_hardware(child, out);
    }
}

fn convert_hardware(node: &LhmNode, kind: HardwareKind) -> HardwareNode {
    let mut hardware = HardwareNode::new(node.text.trim(), kind);

    for child in &node.children {
        if let Some(reading_kind) = group_kind(child.text.trim()) {
            for leaf in &child.children {
                if let Some(reading) = convert_reading(leaf, reading_kind) {
                    hardware.readings.push(reading);
                }
            }
        } else if let Some(child_kind) = hardware_kind(&child.image_url) {
            hardware.children.push(convert_hardware(child, child_kind));
        }
    }

    hardware
}

fn convert_reading(leaf: &LhmNode, kind: ReadingKind) -> Option<Reading> {
    let text = leaf.text.trim();
    if text.is_empty() {
        return None;
    }
    // Sensor text is "<name>: <value>" in older LHM builds, bare name in
    // newer ones; the value column is authoritative either way.
    let name = match text.find(':') {
        Some(pos) => text[..pos].trim(),
        None => text,
    };

    Some(Reading {
        name: name.to_string(),
        kind,
        value: parse_sensor_value(&leaf.value),
        min: parse_sensor_value(&leaf.min),
        max: parse_sensor_value(&leaf.max),
    })
}

/// Map the node icon to a hardware kind. Unrecognized icons yield `None`
/// and the node is treated as a container.
fn hardware_kind(image_url: &str) -> Option<HardwareKind> {
    let file = image_url.rsplit('/').next().unwrap_or(image_url);
    match file {
        "cpu.png" => Some(HardwareKind::Cpu),
        "nvidia.png" => Some(HardwareKind::GpuNvidia),
        "ati.png" | "amd.png" => Some(HardwareKind::GpuAmd),
        "intel.png" => Some(HardwareKind::GpuIntel),
        "ram.png" => Some(HardwareKind::Memory),
        "hdd.png" | "ssd.png" => Some(HardwareKind::Storage),
        "nic.png" => Some(HardwareKind::Network),
        "battery.png" => Some(HardwareKind::Battery),
        "mainboard.png" => Some(HardwareKind::Motherboard),
        "chip.png" => Some(HardwareKind::SuperIo),
        _ => None,
    }
}

/// Map a sensor-group node label to the reading kind of its leaves.
fn group_kind(text: &str) -> Option<ReadingKind> {
    match text {
        "Temperatures" => Some(ReadingKind::Temperature),
        "Voltages" => Some(ReadingKind::Voltage),
        "Currents" => Some(ReadingKind::Current),
        "Clocks" => Some(ReadingKind::Clock),
        "Load" => Some(ReadingKind::Load),
        "Fans" => Some(ReadingKind::Fan),
        "Controls" => Some(ReadingKind::Control),
        "Levels" => Some(ReadingKind::Level),
        "Factors" => Some(ReadingKind::Factor),
        "Powers" => Some(ReadingKind::Power),
        "Data" => Some(ReadingKind::Data),
        "Small Data" => Some(ReadingKind::SmallData),
        "Throughput" => Some(ReadingKind::Throughput),
        "Energies" => Some(ReadingKind::Energy),
        _ => None,
    }
}

/// Parse a display string like "65.2 °C", "1200 RPM", "0,8 V" into f32.
fn parse_sensor_value(s: &str) -> Option<f32> {
    let s = s.trim();
    if s.is_empty() || s == "-" || s == "N/A" {
        return None;
    }
    let num_str: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == ',')
        .collect();
    let num_str = num_str.replace(',', ".");
    num_str.parse::<f32>().ok()
}
