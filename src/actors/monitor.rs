//! MonitorActor - owns one monitoring session against the emulator
//!
//! The actor holds the only mutable alert state and runs ticks strictly
//! sequentially; a slow emulator delays the next tick instead of piling up
//! overlapping requests.
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → Sample nodes → Score verdict → Evaluate alerts → Publish TelemetryEvent
//!     ↑
//!     └─── Commands (SelectProject, TickNow, Shutdown)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, instrument, trace, warn};

use crate::alerts::AlertEngine;
use crate::classifier::{self, AnomalyModel, Verdict};
use crate::config::MonitorConfig;
use crate::gns3::Gns3Client;
use crate::sampler::MetricsSampler;

use super::messages::{MonitorCommand, SessionSnapshot, TelemetryEvent};

/// Ticker periods for both actor states.
#[derive(Debug, Clone, Copy)]
pub struct MonitorIntervals {
    poll: Duration,
    idle: Duration,
}

impl MonitorIntervals {
    /// Tokio intervals reject a zero period, so seconds clamp to at least
    /// one.
    pub fn from_secs(poll_secs: u64, idle_secs: u64) -> Self {
        MonitorIntervals {
            poll: Duration::from_secs(poll_secs.max(1)),
            idle: Duration::from_secs(idle_secs.max(1)),
        }
    }
}

impl From<&MonitorConfig> for MonitorIntervals {
    fn from(config: &MonitorConfig) -> Self {
        MonitorIntervals::from_secs(config.poll_interval_secs, config.idle_interval_secs)
    }
}

/// Actor that samples, scores and evaluates one project at a time
pub struct MonitorActor {
    /// Emulator client (reused across ticks)
    client: Gns3Client,

    /// Metric acquisition, device states plus scalar channels
    sampler: MetricsSampler,

    /// Optional anomaly model; absence publishes `unavailable` verdicts
    model: Option<Arc<dyn AnomalyModel>>,

    /// Threshold alerting state machine
    engine: AlertEngine,

    /// Currently monitored project; `None` keeps ticks as no-ops
    project_id: Option<String>,

    /// Ticker periods for the monitoring respectively idle state
    intervals: MonitorIntervals,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<MonitorCommand>,

    /// Broadcast sender for per-tick telemetry
    telemetry_tx: broadcast::Sender<TelemetryEvent>,

    /// End-of-tick state shared with snapshot readers
    snapshot: Arc<RwLock<SessionSnapshot>>,
}

impl MonitorActor {
    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command arrives or the command channel closes.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting monitor actor");

        let mut ticker = interval(self.intervals.idle);

        loop {
            tokio::select! {
                // Commands win simultaneous readiness, so a project switch
                // is observed before one more sample of the old project
                // can begin.
                biased;

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        MonitorCommand::SelectProject { project_id, respond_to } => {
                            debug!(%project_id, "switching monitored project");
                            self.engine.reset();
                            *self.snapshot.write().await = SessionSnapshot {
                                project_id: Some(project_id.clone()),
                                ..SessionSnapshot::default()
                            };
                            self.project_id = Some(project_id);
                            ticker = interval(self.intervals.poll);
                            let _ = respond_to.send(());
                        }

                        MonitorCommand::TickNow { respond_to } => {
                            debug!("received TickNow command");
                            let result = self.tick().await;
                            let _ = respond_to.send(result);
                        }

                        MonitorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    if self.project_id.is_none() {
                        trace!("idle tick, no project selected");
                    } else if let Err(e) = self.tick().await {
                        warn!("skipping tick: {e:#}");
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("monitor actor stopped");
    }

    /// Run a single tick: sample, score, evaluate, publish.
    ///
    /// A failed sample skips the whole tick. Active alerts stay untouched,
    /// no telemetry goes out, and the next interval retries. There is no
    /// backoff; the emulator is local and either answers or does not.
    #[instrument(skip(self), fields(project = ?self.project_id))]
    async fn tick(&mut self) -> Result<()> {
        let Some(project_id) = self.project_id.clone() else {
            anyhow::bail!("no project selected");
        };

        let sample = self
            .sampler
            .sample(&self.client, &project_id)
            .await
            .context("failed to sample project")?;

        let verdict = match &self.model {
            Some(model) => Verdict::from(model.score(&classifier::vector(&sample))),
            None => Verdict::Unavailable,
        };

        let delta = self.engine.evaluate(&sample);
        trace!(
            fired = delta.fired.len(),
            cleared = delta.cleared.len(),
            ?verdict,
            "tick evaluated"
        );

        let alerts = self.engine.active();

        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.project_id = Some(project_id.clone());
            snapshot.devices = sample.devices.clone();
            snapshot.alerts = alerts.clone();
            snapshot.verdict = Some(verdict);
            snapshot.last_tick = Some(sample.timestamp);
        }

        let event = TelemetryEvent {
            project_id,
            sample,
            verdict,
            alerts,
        };

        // Send errors just mean nobody is listening right now.
        match self.telemetry_tx.send(event) {
            Ok(receivers) => trace!("published telemetry to {receivers} receivers"),
            Err(_) => trace!("no telemetry subscribers"),
        }

        Ok(())
    }
}

/// Handle for controlling a MonitorActor
///
/// Cloneable; all clones talk to the same actor.
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    telemetry_tx: broadcast::Sender<TelemetryEvent>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
}

impl MonitorHandle {
    /// Spawn a monitor actor and return its handle.
    pub fn spawn(
        client: Gns3Client,
        sampler: MetricsSampler,
        model: Option<Arc<dyn AnomalyModel>>,
        intervals: MonitorIntervals,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (telemetry_tx, _) = broadcast::channel(64);
        let snapshot = Arc::new(RwLock::new(SessionSnapshot::default()));

        let actor = MonitorActor {
            client,
            sampler,
            model,
            engine: AlertEngine::new(),
            project_id: None,
            intervals,
            command_rx: cmd_rx,
            telemetry_tx: telemetry_tx.clone(),
            snapshot: snapshot.clone(),
        };

        tokio::spawn(actor.run());

        MonitorHandle {
            sender: cmd_tx,
            telemetry_tx,
            snapshot,
        }
    }

    /// Point the monitor at a project. Previous alert state is dropped.
    pub async fn select_project(&self, project_id: impl Into<String>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::SelectProject {
                project_id: project_id.into(),
                respond_to: tx,
            })
            .await
            .context("failed to send SelectProject command")?;
        rx.await.context("failed to receive response")?;
        Ok(())
    }

    /// Trigger an immediate tick, bypassing the interval timer.
    pub async fn tick_now(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::TickNow { respond_to: tx })
            .await
            .context("failed to send TickNow command")?;
        rx.await.context("failed to receive response")??;
        Ok(())
    }

    /// Clone of the last end-of-tick state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Subscribe to per-tick telemetry.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryEvent> {
        self.telemetry_tx.subscribe()
    }

    /// Gracefully shut down the monitor.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(MonitorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
