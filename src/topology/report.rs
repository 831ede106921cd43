//! Per-resource outcome bookkeeping for a build run.
//!
//! A build never rolls back: whatever the emulator accepted stays on the
//! canvas, and the report is the only place that says what is real.

use std::collections::BTreeMap;
use std::fmt;

use crate::gns3::Gns3Error;

/// Failures that make continuing pointless. Everything downstream of the
/// project, its templates and the core switch degrades per-resource instead.
#[derive(Debug)]
pub enum BuildAbort {
    ProjectCreation(Gns3Error),
    TemplateLookup { template: String, error: Gns3Error },
    CoreSwitchCreation(Gns3Error),
}

impl fmt::Display for BuildAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildAbort::ProjectCreation(error) => {
                write!(f, "could not create project: {error}")
            }
            BuildAbort::TemplateLookup { template, error } => {
                write!(f, "could not resolve template '{template}': {error}")
            }
            BuildAbort::CoreSwitchCreation(error) => {
                write!(f, "could not create the core switch: {error}")
            }
        }
    }
}

impl std::error::Error for BuildAbort {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildAbort::ProjectCreation(error) => Some(error),
            BuildAbort::TemplateLookup { error, .. } => Some(error),
            BuildAbort::CoreSwitchCreation(error) => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    Created { node_id: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Created { link_id: String },
    Failed { error: String },
    /// One of the link's devices never made it onto the canvas.
    Skipped { missing_node: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    Pushed,
    Failed { error: String },
    /// The device was never created or has no working uplink.
    Skipped { missing_node: String },
}

/// Everything one build run did, keyed by device name respectively link key.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub project_id: Option<String>,
    pub nodes: BTreeMap<String, NodeOutcome>,
    pub links: BTreeMap<String, LinkOutcome>,
    pub configs: BTreeMap<String, ConfigOutcome>,
    pub aborted: Option<BuildAbort>,
}

impl BuildReport {
    pub fn new() -> Self {
        BuildReport::default()
    }

    pub fn node_id(&self, name: &str) -> Option<&str> {
        match self.nodes.get(name) {
            Some(NodeOutcome::Created { node_id }) => Some(node_id),
            _ => None,
        }
    }

    /// True when the project exists and every planned resource landed.
    pub fn is_complete(&self) -> bool {
        if self.aborted.is_some() || self.project_id.is_none() {
            return false;
        }
        let summary = self.summary();
        summary.nodes_failed == 0
            && summary.links_failed == 0
            && summary.links_skipped == 0
            && summary.configs_failed == 0
            && summary.configs_skipped == 0
    }

    pub fn summary(&self) -> BuildSummary {
        let mut summary = BuildSummary::default();
        for outcome in self.nodes.values() {
            match outcome {
                NodeOutcome::Created { .. } => summary.nodes_created += 1,
                NodeOutcome::Failed { .. } => summary.nodes_failed += 1,
            }
        }
        for outcome in self.links.values() {
            match outcome {
                LinkOutcome::Created { .. } => summary.links_created += 1,
                LinkOutcome::Failed { .. } => summary.links_failed += 1,
                LinkOutcome::Skipped { .. } => summary.links_skipped += 1,
            }
        }
        for outcome in self.configs.values() {
            match outcome {
                ConfigOutcome::Pushed => summary.configs_pushed += 1,
                ConfigOutcome::Failed { .. } => summary.configs_failed += 1,
                ConfigOutcome::Skipped { .. } => summary.configs_skipped += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub nodes_created: usize,
    pub nodes_failed: usize,
    pub links_created: usize,
    pub links_failed: usize,
    pub links_skipped: usize,
    pub configs_pushed: usize,
    pub configs_failed: usize,
    pub configs_skipped: usize,
}
