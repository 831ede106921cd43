//! Star-of-stars topology planning and construction.
//!
//! [`planner`] turns a build configuration into a [`TopologyPlan`] without
//! touching the network; [`builder`] executes a plan against the emulator
//! and records every outcome in a [`report::BuildReport`].

pub mod builder;
pub mod planner;
pub mod report;

pub const CORE_SWITCH_NAME: &str = "Core-Switch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Switch,
    Endpoint,
}

impl NodeKind {
    /// Wire value the emulator expects in a node's `node_type` field.
    pub fn node_type(&self) -> &'static str {
        match self {
            NodeKind::Switch => "ethernet_switch",
            NodeKind::Endpoint => "vpcs",
        }
    }
}

/// A device the plan wants on the canvas, with the emulator template it is
/// stamped from. Positions stay `f64` here and are rounded at the wire
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    pub template: String,
    pub x: f64,
    pub y: f64,
}

/// A cable between two planned devices, by name. The builder resolves names
/// to emulator ids once the devices exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub node_a: String,
    pub port_a: u32,
    pub node_b: String,
    pub port_b: u32,
}

impl LinkSpec {
    /// Stable identifier used to report on this link.
    pub fn key(&self) -> String {
        format!(
            "{}:{}<->{}:{}",
            self.node_a, self.port_a, self.node_b, self.port_b
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAssignment {
    pub device: String,
    pub address: String,
    pub netmask: String,
    pub gateway: String,
}

impl AddressAssignment {
    /// Startup script content for an endpoint's console, in the dialect the
    /// emulated PCs understand.
    pub fn startup_script(&self) -> String {
        format!("ip {} {} {}\nsave", self.address, self.netmask, self.gateway)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyPlan {
    pub project_name: String,
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
    pub addresses: Vec<AddressAssignment>,
}

impl TopologyPlan {
    pub fn switch_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Switch)
            .count()
    }

    pub fn endpoint_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Endpoint)
            .count()
    }
}
