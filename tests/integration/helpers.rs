//! Helper functions for integration tests

use async_trait::async_trait;
use netlab_monitoring::config::{BuildConfig, EmulatorConfig};
use netlab_monitoring::gns3::Gns3Client;
use netlab_monitoring::sampler::{MetricReading, MetricSource};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn emulator_client(server: &MockServer) -> Gns3Client {
    Gns3Client::new(&EmulatorConfig {
        url: server.uri(),
        timeout_secs: 5,
    })
}

/// Build configuration pointing at the standard test templates, with the
/// settle delay disabled so tests run instantly.
pub fn build_config(project_name: &str, target_devices: u32, switch_ports: u32) -> BuildConfig {
    BuildConfig {
        project_name: project_name.to_string(),
        switch_template: String::from("Ethernet switch"),
        endpoint_template: String::from("VPCS"),
        switch_ports,
        target_devices,
        base_ip: String::from("192.168.1."),
        subnet_mask: String::from("255.255.255.0"),
        settle_delay_ms: 0,
    }
}

/// Mounts the template catalog every build scenario resolves against.
pub async fn mount_templates(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "template_id": "t-switch", "name": "Ethernet switch" },
            { "template_id": "t-pc", "name": "VPCS" },
        ])))
        .mount(server)
        .await;
}

/// Mounts a project create endpoint answering with the given id.
pub async fn mount_project_create(server: &MockServer, project_id: &str) {
    let project_id = project_id.to_string();
    Mock::given(method("POST"))
        .and(path("/v2/projects"))
        .respond_with(move |request: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            ResponseTemplate::new(201).set_body_json(json!({
                "project_id": project_id,
                "name": body["name"],
                "status": "opened",
            }))
        })
        .mount(server)
        .await;
}

/// Mounts a node create endpoint deriving ids from device names, so link
/// requests become assertable without bookkeeping.
pub async fn mount_node_create(server: &MockServer, project_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v2/projects/{project_id}/nodes")))
        .respond_with(|request: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let name = body["name"].as_str().unwrap_or("unknown").to_string();
            ResponseTemplate::new(201).set_body_json(json!({
                "node_id": format!("id-{name}"),
                "name": name,
                "status": "started",
            }))
        })
        .mount(server)
        .await;
}

/// Source that replays a fixed list of readings, repeating the last one.
pub struct ScriptedSource {
    readings: Vec<MetricReading>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(readings: Vec<MetricReading>) -> Self {
        ScriptedSource { readings, next: 0 }
    }
}

#[async_trait]
impl MetricSource for ScriptedSource {
    async fn measure(&mut self) -> MetricReading {
        let index = self.next.min(self.readings.len() - 1);
        self.next += 1;
        self.readings[index]
    }
}

pub fn quiet_reading() -> MetricReading {
    MetricReading {
        cpu: 25.0,
        memory: 35.0,
        bandwidth: 250.0,
        latency_ms: 18.0,
        packet_loss_pct: 0.3,
        error_rate: 0.8,
    }
}

pub fn hot_cpu_reading() -> MetricReading {
    MetricReading {
        cpu: 96.5,
        ..quiet_reading()
    }
}

pub fn congested_reading() -> MetricReading {
    MetricReading {
        cpu: 94.0,
        latency_ms: 140.0,
        ..quiet_reading()
    }
}
