//! On-demand remediation dispatch.
//!
//! Execution is simulated: each action emits structured log lines instead
//! of touching the emulator. Results are ephemeral and go back to whoever
//! asked; nothing here runs automatically when alerts fire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::alerts::AlertKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationRequest {
    pub alert_kind: String,
    pub device: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    LoadBalancing,
    TrafficReroute,
    DeviceRestart,
}

impl RemediationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemediationAction::LoadBalancing => "load_balancing",
            RemediationAction::TrafficReroute => "traffic_reroute",
            RemediationAction::DeviceRestart => "device_restart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationStatus {
    Initiated,
    Attempted,
    NoActionAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationResult {
    pub action: Option<RemediationAction>,
    pub status: RemediationStatus,
    pub target: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemediationDispatcher;

impl RemediationDispatcher {
    pub fn new() -> Self {
        RemediationDispatcher
    }

    #[instrument(skip(self))]
    pub fn dispatch(&self, request: &RemediationRequest) -> RemediationResult {
        let Ok(kind) = request.alert_kind.parse::<AlertKind>() else {
            warn!(
                kind = %request.alert_kind,
                "no remediation available for unknown alert kind"
            );
            return RemediationResult {
                action: None,
                status: RemediationStatus::NoActionAvailable,
                target: None,
                timestamp: Utc::now(),
            };
        };

        let action = kind.remediation();
        let (status, target) = match action {
            RemediationAction::LoadBalancing => {
                info!("shifting endpoint load across access switches");
                (RemediationStatus::Initiated, None)
            }
            RemediationAction::TrafficReroute => {
                info!("rerouting traffic around the congested path");
                (RemediationStatus::Initiated, None)
            }
            RemediationAction::DeviceRestart => {
                info!(device = ?request.device, "requesting restart of offline device");
                (RemediationStatus::Attempted, request.device.clone())
            }
        };

        RemediationResult {
            action: Some(action),
            status,
            target,
            timestamp: Utc::now(),
        }
    }
}
