//! Pure topology planning. No I/O happens here, which keeps the layout math
//! and addressing scheme trivially testable.

use std::f64::consts::TAU;

use crate::config::BuildConfig;
use crate::topology::{
    AddressAssignment, CORE_SWITCH_NAME, LinkSpec, NodeKind, NodeSpec, TopologyPlan,
};

const CORE_POSITION: (f64, f64) = (0.0, -200.0);
const ACCESS_RING_RADIUS: f64 = 400.0;
const ENDPOINT_RING_RADIUS: f64 = 150.0;

/// First host octet handed to endpoints; `PC-1` becomes `.11`, leaving room
/// below for gateways and infrastructure.
const HOST_OFFSET: u32 = 10;

pub fn access_switch_name(index: u32) -> String {
    format!("Access-Switch-{index}")
}

pub fn endpoint_name(index: u32) -> String {
    format!("PC-{index}")
}

/// Expands a build configuration into the full device, cabling and
/// addressing plan.
///
/// Each access switch keeps one port for its core uplink, so it carries
/// `switch_ports - 1` endpoints. The switch count is `target_devices`
/// integer-divided by that capacity, plus one: headroom is always planned,
/// even when the division is exact.
///
/// Uplinks land on core ports equal to the access switch ordinal. Nothing
/// checks that ordinal against the core's own port count; a core switch
/// template with too few ports surfaces as link failures at build time.
///
/// Expects a configuration that passed [`BuildConfig::validate`]: with
/// fewer than two ports a switch has no device ports, and planning panics.
pub fn plan(config: &BuildConfig) -> TopologyPlan {
    debug_assert!(
        config.switch_ports >= 2,
        "switch_ports must leave at least one device port"
    );
    let per_switch = config.switch_ports - 1;
    let switch_count = config.target_devices / per_switch + 1;

    let mut nodes = vec![NodeSpec {
        name: CORE_SWITCH_NAME.to_string(),
        kind: NodeKind::Switch,
        template: config.switch_template.clone(),
        x: CORE_POSITION.0,
        y: CORE_POSITION.1,
    }];
    let mut links = Vec::new();
    let mut addresses = Vec::new();

    for index in 1..=switch_count {
        let angle = TAU * (index - 1) as f64 / switch_count as f64;
        nodes.push(NodeSpec {
            name: access_switch_name(index),
            kind: NodeKind::Switch,
            template: config.switch_template.clone(),
            x: ACCESS_RING_RADIUS * angle.cos(),
            y: ACCESS_RING_RADIUS * angle.sin(),
        });
        links.push(LinkSpec {
            node_a: access_switch_name(index),
            port_a: 0,
            node_b: CORE_SWITCH_NAME.to_string(),
            port_b: index,
        });
    }

    for n in 1..=config.target_devices {
        let switch_index = (n - 1) / per_switch + 1;
        let port = (n - 1) % per_switch + 1;

        // Access switches sit at indices 1..=switch_count, right after the
        // core pushed above.
        let parent = &nodes[switch_index as usize];
        let (parent_name, parent_x, parent_y) = (parent.name.clone(), parent.x, parent.y);

        let angle = TAU * (port - 1) as f64 / per_switch as f64;
        nodes.push(NodeSpec {
            name: endpoint_name(n),
            kind: NodeKind::Endpoint,
            template: config.endpoint_template.clone(),
            x: parent_x + ENDPOINT_RING_RADIUS * angle.cos(),
            y: parent_y + ENDPOINT_RING_RADIUS * angle.sin(),
        });
        links.push(LinkSpec {
            node_a: endpoint_name(n),
            port_a: 0,
            node_b: parent_name,
            port_b: port,
        });
        addresses.push(AddressAssignment {
            device: endpoint_name(n),
            address: format!("{}{}", config.base_ip, n + HOST_OFFSET),
            netmask: config.subnet_mask.clone(),
            gateway: config.gateway_ip(),
        });
    }

    TopologyPlan {
        project_name: config.project_name.clone(),
        nodes,
        links,
        addresses,
    }
}
