//! Request/response types for the emulator's REST endpoints.
//!
//! Every call has an explicit struct on both sides; fields the emulator may
//! omit are `Option`s instead of silent lookups. Coordinate rounding happens
//! here, at the wire boundary, so plans can keep full-precision positions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub auto_close: bool,
    pub auto_open: bool,
    pub auto_start: bool,
}

impl CreateProjectRequest {
    /// Project that opens and starts its devices on creation and survives
    /// client disconnects.
    pub fn named(name: &str) -> Self {
        CreateProjectRequest {
            name: name.to_string(),
            auto_close: false,
            auto_open: true,
            auto_start: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNodeRequest {
    pub name: String,
    pub node_type: String,
    pub compute_id: String,
    pub template_id: String,
    pub x: i32,
    pub y: i32,
    pub properties: NodeProperties,
}

impl CreateNodeRequest {
    pub fn new(
        name: &str,
        node_type: &str,
        template_id: &str,
        x: f64,
        y: f64,
        properties: NodeProperties,
    ) -> Self {
        CreateNodeRequest {
            name: name.to_string(),
            node_type: node_type.to_string(),
            compute_id: String::from("local"),
            template_id: template_id.to_string(),
            x: x.round() as i32,
            y: y.round() as i32,
            properties,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_auto_start: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub node_id: String,
    pub name: String,
    pub status: Option<String>,
    pub node_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLinkRequest {
    pub nodes: [LinkEnd; 2],
}

impl CreateLinkRequest {
    pub fn between(a: LinkEnd, b: LinkEnd) -> Self {
        CreateLinkRequest { nodes: [a, b] }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkEnd {
    pub node_id: String,
    pub adapter_number: u32,
    pub port_number: u32,
}

impl LinkEnd {
    /// All emulated devices here are single-adapter; only ports vary.
    pub fn port(node_id: &str, port_number: u32) -> Self {
        LinkEnd {
            node_id: node_id.to_string(),
            adapter_number: 0,
            port_number,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub link_id: String,
}
