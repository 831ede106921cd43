//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Commands**: request/response messages sent to the monitor via mpsc
//! 2. **Events**: broadcast notifications published to multiple subscribers
//! 3. **Immutability**: all messages are cloneable for multi-subscriber patterns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::alerts::AlertEvent;
use crate::classifier::Verdict;
use crate::{DeviceState, MetricSample};

/// Event published once per completed monitoring tick.
///
/// The broadcast channel may lag or drop messages for slow subscribers -
/// acceptable, since the next tick carries the full current state again.
/// The shape is a wire contract: push transports forward it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Project the tick observed
    pub project_id: String,

    /// The full sample the tick was based on
    pub sample: MetricSample,

    /// Classifier verdict for the sample (`unavailable` without a model)
    pub verdict: Verdict,

    /// Active alert set after evaluation, in priority order
    pub alerts: Vec<AlertEvent>,
}

/// Commands that can be sent to the MonitorActor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Replace the monitored project
    ///
    /// Clears alert state and the session snapshot before acknowledging.
    /// Takes effect between ticks; an in-flight tick still belongs to the
    /// previous project.
    SelectProject {
        project_id: String,
        respond_to: oneshot::Sender<()>,
    },

    /// Run one tick immediately (bypassing the interval timer)
    ///
    /// Used for testing and manual refresh operations.
    TickNow {
        respond_to: oneshot::Sender<anyhow::Result<()>>,
    },

    /// Gracefully shut down the monitor
    ///
    /// The actor finishes any in-flight tick and then exits.
    Shutdown,
}

/// Last observed session state, written by the monitor at the end of each
/// tick and handed out as a clone. Readers may see a state one tick old.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Currently monitored project, if any
    pub project_id: Option<String>,

    /// Device states from the most recent sample
    pub devices: Vec<DeviceState>,

    /// Active alerts after the most recent evaluation
    pub alerts: Vec<AlertEvent>,

    /// Verdict of the most recent tick
    pub verdict: Option<Verdict>,

    /// Timestamp of the most recent completed tick
    pub last_tick: Option<DateTime<Utc>>,
}
