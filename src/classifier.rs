//! Anomaly scoring over fixed-order metric vectors.
//!
//! The label set is a closed contract shared with the externally trained
//! scoring function. The in-tree [`HeuristicModel`] speaks the same
//! contract so the monitor works without a trained model; a real one is
//! plugged in through [`AnomalyModel`].

use serde::{Deserialize, Serialize};

use crate::MetricSample;

/// Feature order is part of the contract: cpu, memory, bandwidth,
/// latency_ms, packet_loss_pct, error_rate.
pub type MetricVector = [f64; 6];

pub fn vector(sample: &MetricSample) -> MetricVector {
    [
        sample.cpu,
        sample.memory,
        sample.bandwidth,
        sample.latency_ms,
        sample.packet_loss_pct,
        sample.error_rate,
    ]
}

/// Labels a model may emit. `None` exists in the trained label set; the
/// in-tree heuristic never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLabel {
    None,
    Normal,
    HighCpu,
    HighMemory,
    HighLatency,
    PacketLoss,
    BandwidthSaturation,
    HighErrors,
    MultipleIssues,
}

/// What actually gets published per tick: every label, plus the state where
/// no model is loaded at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    None,
    Normal,
    HighCpu,
    HighMemory,
    HighLatency,
    PacketLoss,
    BandwidthSaturation,
    HighErrors,
    MultipleIssues,
    Unavailable,
}

impl From<IssueLabel> for Verdict {
    fn from(value: IssueLabel) -> Self {
        match value {
            IssueLabel::None => Verdict::None,
            IssueLabel::Normal => Verdict::Normal,
            IssueLabel::HighCpu => Verdict::HighCpu,
            IssueLabel::HighMemory => Verdict::HighMemory,
            IssueLabel::HighLatency => Verdict::HighLatency,
            IssueLabel::PacketLoss => Verdict::PacketLoss,
            IssueLabel::BandwidthSaturation => Verdict::BandwidthSaturation,
            IssueLabel::HighErrors => Verdict::HighErrors,
            IssueLabel::MultipleIssues => Verdict::MultipleIssues,
        }
    }
}

pub trait AnomalyModel: Send + Sync {
    fn score(&self, metrics: &MetricVector) -> IssueLabel;
}

const CPU_LIMIT: f64 = 90.0;
const MEMORY_LIMIT: f64 = 90.0;
const BANDWIDTH_LIMIT: f64 = 900.0;
const LATENCY_LIMIT_MS: f64 = 100.0;
const PACKET_LOSS_LIMIT: f64 = 5.0;
const ERROR_RATE_LIMIT: f64 = 10.0;

/// Threshold model: one metric out of range yields its label, two or more
/// yield `MultipleIssues`, none yields `Normal`.
pub struct HeuristicModel;

impl AnomalyModel for HeuristicModel {
    fn score(&self, metrics: &MetricVector) -> IssueLabel {
        let [cpu, memory, bandwidth, latency_ms, packet_loss_pct, error_rate] = *metrics;

        let mut found = Vec::new();
        if cpu > CPU_LIMIT {
            found.push(IssueLabel::HighCpu);
        }
        if memory > MEMORY_LIMIT {
            found.push(IssueLabel::HighMemory);
        }
        if latency_ms > LATENCY_LIMIT_MS {
            found.push(IssueLabel::HighLatency);
        }
        if packet_loss_pct > PACKET_LOSS_LIMIT {
            found.push(IssueLabel::PacketLoss);
        }
        if bandwidth > BANDWIDTH_LIMIT {
            found.push(IssueLabel::BandwidthSaturation);
        }
        if error_rate > ERROR_RATE_LIMIT {
            found.push(IssueLabel::HighErrors);
        }

        match found.as_slice() {
            [] => IssueLabel::Normal,
            [single] => *single,
            _ => IssueLabel::MultipleIssues,
        }
    }
}
