//! Threshold alerting with an active-set state machine.
//!
//! Every evaluation compares the current sample against fixed rules and
//! reconciles the result with the set of already-active alerts: conditions
//! fire once when they appear, stay silently active while they persist and
//! are reported once more when they clear. Keys are (kind, device), so one
//! offline device cannot mask another.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::MetricSample;
use crate::remediation::RemediationAction;

const CPU_LIMIT: f64 = 90.0;
const LATENCY_LIMIT_MS: f64 = 100.0;

/// Declaration order is reporting priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HighCpu,
    HighLatency,
    DeviceDown,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::HighCpu => "high_cpu",
            AlertKind::HighLatency => "high_latency",
            AlertKind::DeviceDown => "device_down",
        }
    }

    /// Action the dispatcher would take for this kind of alert. The engine
    /// only suggests; nothing here triggers remediation on its own.
    pub fn remediation(&self) -> RemediationAction {
        match self {
            AlertKind::HighCpu => RemediationAction::LoadBalancing,
            AlertKind::HighLatency => RemediationAction::TrafficReroute,
            AlertKind::DeviceDown => RemediationAction::DeviceRestart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlertKind(pub String);

impl fmt::Display for UnknownAlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown alert kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownAlertKind {}

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high_cpu" => Ok(AlertKind::HighCpu),
            "high_latency" => Ok(AlertKind::HighLatency),
            "device_down" => Ok(AlertKind::DeviceDown),
            _ => Err(UnknownAlertKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub severity: Severity,
    pub device: Option<String>,
    pub message: String,
    pub first_seen: DateTime<Utc>,
    pub active: bool,
}

type AlertKey = (AlertKind, Option<String>);

/// Fired and cleared events from a single evaluation, in rule priority
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertDelta {
    pub fired: Vec<AlertEvent>,
    pub cleared: Vec<AlertEvent>,
}

#[derive(Debug, Default)]
pub struct AlertEngine {
    current: HashMap<AlertKey, AlertEvent>,
}

impl AlertEngine {
    pub fn new() -> Self {
        AlertEngine::default()
    }

    /// Reconciles one sample against the active set.
    ///
    /// A condition that already has an active event keeps it untouched,
    /// including its `first_seen` stamp. A condition seen for the first
    /// time lands in `fired`; an active event whose condition vanished is
    /// removed and lands in `cleared` with `active` unset.
    pub fn evaluate(&mut self, sample: &MetricSample) -> AlertDelta {
        let conditions = Self::conditions(sample);
        let desired: HashSet<AlertKey> = conditions.iter().map(|(key, ..)| key.clone()).collect();

        let now = Utc::now();
        let mut delta = AlertDelta::default();

        for (key, severity, message) in conditions {
            if self.current.contains_key(&key) {
                continue;
            }
            let event = AlertEvent {
                kind: key.0,
                severity,
                device: key.1.clone(),
                message,
                first_seen: now,
                active: true,
            };
            debug!(kind = event.kind.as_str(), device = ?event.device, "alert fired");
            self.current.insert(key, event.clone());
            delta.fired.push(event);
        }

        let mut gone: Vec<AlertKey> = self
            .current
            .keys()
            .filter(|key| !desired.contains(*key))
            .cloned()
            .collect();
        gone.sort();
        for key in gone {
            if let Some(mut event) = self.current.remove(&key) {
                debug!(kind = event.kind.as_str(), device = ?event.device, "alert cleared");
                event.active = false;
                delta.cleared.push(event);
            }
        }

        delta
    }

    /// Rule table, evaluated top to bottom. Device rules produce one
    /// condition per non-started device.
    fn conditions(sample: &MetricSample) -> Vec<(AlertKey, Severity, String)> {
        let mut conditions = Vec::new();

        if sample.cpu > CPU_LIMIT {
            conditions.push((
                (AlertKind::HighCpu, None),
                Severity::Critical,
                format!("CPU usage critical ({:.1}%)", sample.cpu),
            ));
        }
        if sample.latency_ms > LATENCY_LIMIT_MS {
            conditions.push((
                (AlertKind::HighLatency, None),
                Severity::Warning,
                format!("High latency detected ({:.1}ms)", sample.latency_ms),
            ));
        }
        for device in &sample.devices {
            if device.status.is_down() {
                conditions.push((
                    (AlertKind::DeviceDown, Some(device.name.clone())),
                    Severity::Critical,
                    format!("Device {} is offline", device.name),
                ));
            }
        }

        conditions
    }

    /// Currently active events, sorted by kind priority and device name.
    pub fn active(&self) -> Vec<AlertEvent> {
        let mut events: Vec<_> = self.current.values().cloned().collect();
        events.sort_by(|a, b| (a.kind, &a.device).cmp(&(b.kind, &b.device)));
        events
    }

    /// Drops all state, e.g. when the monitored project changes.
    pub fn reset(&mut self) {
        if !self.current.is_empty() {
            debug!(dropped = self.current.len(), "alert state reset");
        }
        self.current.clear();
    }
}
