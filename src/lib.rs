pub mod actors;
pub mod alerts;
pub mod classifier;
pub mod config;
pub mod gns3;
pub mod remediation;
pub mod sampler;
pub mod topology;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub cpu: f64,
    pub memory: f64,
    pub bandwidth: f64,
    pub latency_ms: f64,
    pub packet_loss_pct: f64,
    pub error_rate: f64,
    pub devices: Vec<DeviceState>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub name: String,
    pub status: DeviceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Started,
    Stopped,
    Unknown,
}

impl DeviceStatus {
    /// Collapse the emulator's status string onto the three states the
    /// monitor distinguishes. Anything that is not literally started or
    /// stopped (suspended, booting, ...) maps to Unknown.
    pub fn from_remote(status: &str) -> Self {
        match status {
            "started" => DeviceStatus::Started,
            "stopped" => DeviceStatus::Stopped,
            _ => DeviceStatus::Unknown,
        }
    }

    /// Non-started devices count as down for alerting.
    pub fn is_down(self) -> bool {
        self != DeviceStatus::Started
    }
}
