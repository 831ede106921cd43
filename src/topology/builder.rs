//! Plan execution against a live emulator.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::config::BuildConfig;
use crate::gns3::Gns3Client;
use crate::gns3::types::{
    CreateLinkRequest, CreateNodeRequest, CreateProjectRequest, LinkEnd, NodeProperties, Template,
};
use crate::topology::report::{BuildAbort, BuildReport, ConfigOutcome, LinkOutcome, NodeOutcome};
use crate::topology::{CORE_SWITCH_NAME, NodeKind, TopologyPlan};

/// File name the emulated PCs read their boot commands from.
const STARTUP_CONFIG_FILE: &str = "startup.vpc";

pub struct TopologyBuilder<'a> {
    client: &'a Gns3Client,
    config: &'a BuildConfig,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(client: &'a Gns3Client, config: &'a BuildConfig) -> Self {
        TopologyBuilder { client, config }
    }

    /// Runs the plan in phases: project, templates, devices, cabling,
    /// endpoint configs. Device, link and config failures are recorded in
    /// the report and skipped over; only a failed project creation,
    /// template lookup or core switch aborts the run, since nothing
    /// downstream can succeed without them.
    #[instrument(skip_all, fields(project = %plan.project_name))]
    pub async fn build(&self, plan: &TopologyPlan) -> BuildReport {
        let mut report = BuildReport::new();

        let project = match self
            .client
            .create_project(&CreateProjectRequest::named(&plan.project_name))
            .await
        {
            Ok(project) => project,
            Err(error) => {
                report.aborted = Some(BuildAbort::ProjectCreation(error));
                return report;
            }
        };
        report.project_id = Some(project.project_id.clone());
        info!(project_id = %project.project_id, "created project");

        let switch_template = match self.resolve_template(&self.config.switch_template).await {
            Ok(template) => template,
            Err(abort) => {
                report.aborted = Some(abort);
                return report;
            }
        };
        let endpoint_template = match self.resolve_template(&self.config.endpoint_template).await {
            Ok(template) => template,
            Err(abort) => {
                report.aborted = Some(abort);
                return report;
            }
        };

        let mut node_ids: HashMap<&str, String> = HashMap::new();
        for spec in &plan.nodes {
            let template = match spec.kind {
                NodeKind::Switch => &switch_template,
                NodeKind::Endpoint => &endpoint_template,
            };
            let properties = match spec.kind {
                NodeKind::Switch => NodeProperties::default(),
                // Endpoint consoles open with the device so the startup
                // script actually runs.
                NodeKind::Endpoint => NodeProperties {
                    console_auto_start: Some(true),
                },
            };
            let request = CreateNodeRequest::new(
                &spec.name,
                spec.kind.node_type(),
                &template.template_id,
                spec.x,
                spec.y,
                properties,
            );
            match self.client.create_node(&project.project_id, &request).await {
                Ok(node) => {
                    node_ids.insert(spec.name.as_str(), node.node_id.clone());
                    report.nodes.insert(
                        spec.name.clone(),
                        NodeOutcome::Created {
                            node_id: node.node_id,
                        },
                    );
                }
                Err(error) => {
                    warn!(device = %spec.name, %error, "device creation failed");
                    report.nodes.insert(
                        spec.name.clone(),
                        NodeOutcome::Failed {
                            error: error.to_string(),
                        },
                    );
                    // Every uplink terminates at the core switch, so there
                    // is nothing left to build without it.
                    if spec.name == CORE_SWITCH_NAME {
                        report.aborted = Some(BuildAbort::CoreSwitchCreation(error));
                        return report;
                    }
                }
            }
        }

        if self.config.settle_delay_ms > 0 {
            // Fresh devices need a moment to register their ports before
            // cabling can reference them.
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        let mut wired: HashSet<&str> = HashSet::new();
        for link in &plan.links {
            let outcome = match (
                node_ids.get(link.node_a.as_str()),
                node_ids.get(link.node_b.as_str()),
            ) {
                (Some(a), Some(b)) => {
                    let request = CreateLinkRequest::between(
                        LinkEnd::port(a, link.port_a),
                        LinkEnd::port(b, link.port_b),
                    );
                    match self.client.create_link(&project.project_id, &request).await {
                        Ok(created) => LinkOutcome::Created {
                            link_id: created.link_id,
                        },
                        Err(error) => {
                            warn!(link = %link.key(), %error, "link creation failed");
                            LinkOutcome::Failed {
                                error: error.to_string(),
                            }
                        }
                    }
                }
                (None, _) => LinkOutcome::Skipped {
                    missing_node: link.node_a.clone(),
                },
                (_, None) => LinkOutcome::Skipped {
                    missing_node: link.node_b.clone(),
                },
            };
            if let LinkOutcome::Created { .. } = outcome {
                wired.insert(link.node_a.as_str());
                wired.insert(link.node_b.as_str());
            }
            report.links.insert(link.key(), outcome);
        }

        // A startup config is only worth pushing to devices that are both
        // on the canvas and cabled to their switch.
        for assignment in &plan.addresses {
            let outcome = match node_ids.get(assignment.device.as_str()) {
                Some(node_id) if wired.contains(assignment.device.as_str()) => {
                    match self
                        .client
                        .upload_node_file(
                            &project.project_id,
                            node_id,
                            STARTUP_CONFIG_FILE,
                            &assignment.startup_script(),
                        )
                        .await
                    {
                        Ok(()) => ConfigOutcome::Pushed,
                        Err(error) => {
                            warn!(device = %assignment.device, %error, "config push failed");
                            ConfigOutcome::Failed {
                                error: error.to_string(),
                            }
                        }
                    }
                }
                _ => ConfigOutcome::Skipped {
                    missing_node: assignment.device.clone(),
                },
            };
            report.configs.insert(assignment.device.clone(), outcome);
        }

        let summary = report.summary();
        info!(
            devices = summary.nodes_created,
            links = summary.links_created,
            configs = summary.configs_pushed,
            "build finished"
        );
        report
    }

    async fn resolve_template(&self, name: &str) -> Result<Template, BuildAbort> {
        self.client
            .find_template(name)
            .await
            .map_err(|error| BuildAbort::TemplateLookup {
                template: name.to_string(),
                error,
            })
    }
}
