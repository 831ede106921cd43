//! Build scenarios against a mocked emulator
//!
//! These tests drive the full plan-then-build path and verify both the
//! requests on the wire and the per-resource outcomes in the report.

use assert_matches::assert_matches;
use netlab_monitoring::gns3::Gns3Error;
use netlab_monitoring::topology::builder::TopologyBuilder;
use netlab_monitoring::topology::planner;
use netlab_monitoring::topology::report::{BuildAbort, ConfigOutcome, LinkOutcome, NodeOutcome};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

async fn mount_link_create(server: &MockServer, project_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v2/projects/{project_id}/links")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "link_id": "l-1" })))
        .mount(server)
        .await;
}

async fn mount_file_upload(server: &MockServer, project_id: &str) {
    Mock::given(method("POST"))
        .and(path_regex(format!(
            "^/v2/projects/{project_id}/nodes/[^/]+/files/startup.vpc$"
        )))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_build_creates_every_planned_resource() {
    let server = MockServer::start().await;

    // The project request carries the auto-open/auto-start flags.
    Mock::given(method("POST"))
        .and(path("/v2/projects"))
        .and(body_json(json!({
            "name": "campus",
            "auto_close": false,
            "auto_open": true,
            "auto_start": true,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "project_id": "p-1",
            "name": "campus",
            "status": "opened",
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_templates(&server).await;
    mount_node_create(&server, "p-1").await;
    mount_link_create(&server, "p-1").await;
    mount_file_upload(&server, "p-1").await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert!(report.aborted.is_none());
    assert!(report.is_complete());
    assert_eq!(report.project_id.as_deref(), Some("p-1"));

    let summary = report.summary();
    assert_eq!(summary.nodes_created, 5); // core + 1 access + 3 endpoints
    assert_eq!(summary.links_created, 4); // 1 uplink + 3 endpoint links
    assert_eq!(summary.configs_pushed, 3);

    assert_eq!(report.node_id("PC-1"), Some("id-PC-1"));
    assert_matches!(
        report.links.get("Access-Switch-1:0<->Core-Switch:1"),
        Some(LinkOutcome::Created { .. })
    );
}

#[tokio::test]
async fn node_and_link_payloads_follow_template_and_layout() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_file_upload(&server, "p-1").await;

    // One device on an 8-port switch: core at (0,-200), the access switch
    // at angle zero on the 400 ring, the endpoint 150 further out.
    for (name, node_type, template_id, x, y, properties) in [
        ("Core-Switch", "ethernet_switch", "t-switch", 0, -200, json!({})),
        ("Access-Switch-1", "ethernet_switch", "t-switch", 400, 0, json!({})),
        ("PC-1", "vpcs", "t-pc", 550, 0, json!({ "console_auto_start": true })),
    ] {
        Mock::given(method("POST"))
            .and(path("/v2/projects/p-1/nodes"))
            .and(body_json(json!({
                "name": name,
                "node_type": node_type,
                "compute_id": "local",
                "template_id": template_id,
                "x": x,
                "y": y,
                "properties": properties,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "node_id": format!("id-{name}"),
                "name": name,
                "status": "started",
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    // Uplink takes core port 1, the endpoint takes access port 1; port 0 on
    // each device faces its parent.
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/links"))
        .and(body_json(json!({ "nodes": [
            { "node_id": "id-Access-Switch-1", "adapter_number": 0, "port_number": 0 },
            { "node_id": "id-Core-Switch", "adapter_number": 0, "port_number": 1 },
        ]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "link_id": "l-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/links"))
        .and(body_json(json!({ "nodes": [
            { "node_id": "id-PC-1", "adapter_number": 0, "port_number": 0 },
            { "node_id": "id-Access-Switch-1", "adapter_number": 0, "port_number": 1 },
        ]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "link_id": "l-2" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = build_config("campus", 1, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;
    assert!(report.is_complete());
}

#[tokio::test]
async fn startup_config_payload_matches_the_addressing_plan() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_node_create(&server, "p-1").await;
    mount_link_create(&server, "p-1").await;

    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/nodes/id-PC-1/files/startup.vpc"))
        .and(body_string("ip 192.168.1.11 255.255.255.0 192.168.1.1\nsave"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/nodes/id-PC-2/files/startup.vpc"))
        .and(body_string("ip 192.168.1.12 255.255.255.0 192.168.1.1\nsave"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = build_config("campus", 2, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;
    assert_eq!(report.summary().configs_pushed, 2);
}

#[tokio::test]
async fn failed_device_degrades_into_skipped_links_and_configs() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_link_create(&server, "p-1").await;
    mount_file_upload(&server, "p-1").await;

    // PC-2 never comes up; everything else is accepted.
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/nodes"))
        .respond_with(|request: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let name = body["name"].as_str().unwrap_or("unknown").to_string();
            if name == "PC-2" {
                ResponseTemplate::new(500).set_body_string("compute exploded")
            } else {
                ResponseTemplate::new(201).set_body_json(json!({
                    "node_id": format!("id-{name}"),
                    "name": name,
                    "status": "started",
                }))
            }
        })
        .mount(&server)
        .await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert!(report.aborted.is_none());
    assert!(!report.is_complete());

    assert_matches!(
        report.nodes.get("PC-2"),
        Some(NodeOutcome::Failed { error }) if error.contains("500")
    );
    assert_matches!(
        report.links.get("PC-2:0<->Access-Switch-1:2"),
        Some(LinkOutcome::Skipped { missing_node }) if missing_node == "PC-2"
    );
    assert_matches!(
        report.configs.get("PC-2"),
        Some(ConfigOutcome::Skipped { missing_node }) if missing_node == "PC-2"
    );

    let summary = report.summary();
    assert_eq!(summary.nodes_created, 4);
    assert_eq!(summary.nodes_failed, 1);
    assert_eq!(summary.links_created, 3);
    assert_eq!(summary.links_skipped, 1);
    assert_eq!(summary.configs_pushed, 2);
    assert_eq!(summary.configs_skipped, 1);
}

#[tokio::test]
async fn failed_access_switch_drops_only_its_own_subtree() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_link_create(&server, "p-1").await;
    mount_file_upload(&server, "p-1").await;

    // Access-Switch-1 never comes up; every other device is accepted.
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/nodes"))
        .respond_with(|request: &wiremock::Request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let name = body["name"].as_str().unwrap_or("unknown").to_string();
            if name == "Access-Switch-1" {
                ResponseTemplate::new(500).set_body_string("compute exploded")
            } else {
                ResponseTemplate::new(201).set_body_json(json!({
                    "node_id": format!("id-{name}"),
                    "name": name,
                    "status": "started",
                }))
            }
        })
        .mount(&server)
        .await;

    // 10 devices on 5-port switches: three access switches carrying
    // PC-1..4, PC-5..8 and PC-9..10.
    let config = build_config("campus", 10, 5);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert!(report.aborted.is_none());
    assert_matches!(
        report.nodes.get("Access-Switch-1"),
        Some(NodeOutcome::Failed { error }) if error.contains("500")
    );

    // The dead switch loses its uplink and every cable and config beneath
    // it, all without a remote call.
    assert_matches!(
        report.links.get("Access-Switch-1:0<->Core-Switch:1"),
        Some(LinkOutcome::Skipped { missing_node }) if missing_node == "Access-Switch-1"
    );
    for n in 1..=4 {
        assert_matches!(
            report.links.get(&format!("PC-{n}:0<->Access-Switch-1:{n}")),
            Some(LinkOutcome::Skipped { missing_node }) if missing_node == "Access-Switch-1"
        );
        assert_matches!(
            report.configs.get(&format!("PC-{n}")),
            Some(ConfigOutcome::Skipped { .. })
        );
    }

    // Endpoints under the surviving switches are built in full.
    assert_matches!(
        report.links.get("PC-5:0<->Access-Switch-2:1"),
        Some(LinkOutcome::Created { .. })
    );
    assert_matches!(report.configs.get("PC-5"), Some(ConfigOutcome::Pushed));
    assert_matches!(report.configs.get("PC-10"), Some(ConfigOutcome::Pushed));

    let summary = report.summary();
    assert_eq!(summary.nodes_created, 13); // core + 2 access + 10 endpoints
    assert_eq!(summary.nodes_failed, 1);
    assert_eq!(summary.links_created, 8); // 2 uplinks + 6 endpoint links
    assert_eq!(summary.links_skipped, 5); // 1 uplink + 4 endpoint links
    assert_eq!(summary.configs_pushed, 6);
    assert_eq!(summary.configs_skipped, 4);
}

#[tokio::test]
async fn project_conflict_aborts_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/projects"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string("Project 'campus' already exists"),
        )
        .mount(&server)
        .await;
    // Nothing downstream may be touched after the abort.
    Mock::given(method("GET"))
        .and(path("/v2/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert_matches!(
        report.aborted,
        Some(BuildAbort::ProjectCreation(Gns3Error::Remote { status: 409, ref body }))
            if body.contains("already exists")
    );
    assert_eq!(report.project_id, None);
    assert!(report.nodes.is_empty());
    assert!(report.links.is_empty());
}

#[tokio::test]
async fn missing_endpoint_template_aborts_after_project_creation() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    Mock::given(method("GET"))
        .and(path("/v2/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "template_id": "t-switch", "name": "Ethernet switch" },
        ])))
        .mount(&server)
        .await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert_matches!(
        report.aborted,
        Some(BuildAbort::TemplateLookup { ref template, error: Gns3Error::TemplateNotFound(_) })
            if template == "VPCS"
    );
    assert_eq!(report.project_id.as_deref(), Some("p-1"));
    assert!(report.nodes.is_empty());
}

#[tokio::test]
async fn fifty_devices_fill_a_ring_of_eight_access_switches() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_node_create(&server, "p-1").await;
    mount_link_create(&server, "p-1").await;
    mount_file_upload(&server, "p-1").await;

    let config = build_config("campus", 50, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert!(report.is_complete());
    let summary = report.summary();
    assert_eq!(summary.nodes_created, 59); // core + 8 access + 50 endpoints
    assert_eq!(summary.links_created, 58); // 8 uplinks + 50 endpoint links
    assert_eq!(summary.configs_pushed, 50);

    // The eighth access switch hangs off core port 8.
    assert_matches!(
        report.links.get("Access-Switch-8:0<->Core-Switch:8"),
        Some(LinkOutcome::Created { .. })
    );
}

#[tokio::test]
async fn core_switch_failure_aborts_before_any_other_node() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;

    // The core switch is the first create call; nothing may follow it.
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/nodes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("compute exploded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/links"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "link_id": "l-1" })))
        .expect(0)
        .mount(&server)
        .await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert_matches!(
        report.aborted,
        Some(BuildAbort::CoreSwitchCreation(Gns3Error::Remote { status: 500, .. }))
    );
    assert_eq!(report.project_id.as_deref(), Some("p-1"));
    assert_matches!(
        report.nodes.get("Core-Switch"),
        Some(NodeOutcome::Failed { .. })
    );
    assert_eq!(report.nodes.len(), 1);
    assert!(report.links.is_empty());
    assert!(report.configs.is_empty());
}

#[tokio::test]
async fn configs_are_withheld_from_uncabled_devices() {
    let server = MockServer::start().await;

    mount_project_create(&server, "p-1").await;
    mount_templates(&server).await;
    mount_node_create(&server, "p-1").await;

    // Every cable is rejected, so no device ever gets its startup config.
    Mock::given(method("POST"))
        .and(path("/v2/projects/p-1/links"))
        .respond_with(ResponseTemplate::new(409).set_body_string("port already used"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex("^/v2/projects/p-1/nodes/[^/]+/files/startup.vpc$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let config = build_config("campus", 3, 8);
    let plan = planner::plan(&config);
    let client = emulator_client(&server);

    let report = TopologyBuilder::new(&client, &config).build(&plan).await;

    assert!(report.aborted.is_none());
    let summary = report.summary();
    assert_eq!(summary.nodes_created, 5);
    assert_eq!(summary.links_failed, 4);
    assert_eq!(summary.configs_pushed, 0);
    assert_eq!(summary.configs_skipped, 3);
    assert_matches!(
        report.configs.get("PC-1"),
        Some(ConfigOutcome::Skipped { missing_node }) if missing_node == "PC-1"
    );
}
