//! Per-tick metric acquisition.
//!
//! Device states are real: they come from the emulator's node list. The six
//! scalar channels come from a [`MetricSource`], because the emulated PCs
//! cannot report load themselves. [`SyntheticMetrics`] fills that gap with
//! uniform draws; a real telemetry feed can implement the trait and slot in
//! without touching the alert engine or the monitor loop.

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gns3::{Gns3Client, Gns3Result};
use crate::{DeviceState, DeviceStatus, MetricSample};

/// One draw of the six scalar channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub cpu: f64,
    pub memory: f64,
    pub bandwidth: f64,
    pub latency_ms: f64,
    pub packet_loss_pct: f64,
    pub error_rate: f64,
}

#[async_trait]
pub trait MetricSource: Send {
    async fn measure(&mut self) -> MetricReading;
}

/// Uniform draws within the value ranges the classifier was designed for:
/// cpu and memory in percent, bandwidth up to 1000 Mb/s, latency between
/// 1 and 200 ms, packet loss up to 10 %, error rate up to 20.
pub struct SyntheticMetrics {
    rng: StdRng,
}

impl SyntheticMetrics {
    pub fn new() -> Self {
        SyntheticMetrics {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        SyntheticMetrics {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SyntheticMetrics {
    fn default() -> Self {
        SyntheticMetrics::new()
    }
}

#[async_trait]
impl MetricSource for SyntheticMetrics {
    async fn measure(&mut self) -> MetricReading {
        MetricReading {
            cpu: self.rng.gen_range(0.0..=100.0),
            memory: self.rng.gen_range(0.0..=100.0),
            bandwidth: self.rng.gen_range(0.0..=1000.0),
            latency_ms: self.rng.gen_range(1.0..=200.0),
            packet_loss_pct: self.rng.gen_range(0.0..=10.0),
            error_rate: self.rng.gen_range(0.0..=20.0),
        }
    }
}

pub struct MetricsSampler {
    source: Box<dyn MetricSource>,
}

impl MetricsSampler {
    pub fn new(source: Box<dyn MetricSource>) -> Self {
        MetricsSampler { source }
    }

    /// Sampler backed by entropy-seeded synthetic readings.
    pub fn synthetic() -> Self {
        MetricsSampler::new(Box::new(SyntheticMetrics::new()))
    }

    /// Takes one sample for the given project. The node list is the only
    /// remote call a tick makes; if it fails the whole tick is worthless,
    /// so the error propagates instead of producing a half-filled sample.
    pub async fn sample(
        &mut self,
        client: &Gns3Client,
        project_id: &str,
    ) -> Gns3Result<MetricSample> {
        let nodes = client.list_nodes(project_id).await?;
        let devices = nodes
            .into_iter()
            .map(|node| DeviceState {
                status: DeviceStatus::from_remote(node.status.as_deref().unwrap_or_default()),
                name: node.name,
            })
            .collect();

        let reading = self.source.measure().await;
        Ok(MetricSample {
            cpu: reading.cpu,
            memory: reading.memory,
            bandwidth: reading.bandwidth,
            latency_ms: reading.latency_ms,
            packet_loss_pct: reading.packet_loss_pct,
            error_rate: reading.error_rate,
            devices,
            timestamp: Utc::now(),
        })
    }
}
