//! Typed client for the GNS3 v2 REST API.
//!
//! One reused [`reqwest::Client`] with a bounded timeout, one method per
//! endpoint the builder and monitor need. Any non-2xx answer becomes a
//! [`Gns3Error::Remote`] carrying the raw response body, so callers never
//! have to re-inspect status codes.

pub mod types;

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::EmulatorConfig;
use types::{
    CreateLinkRequest, CreateNodeRequest, CreateProjectRequest, Link, Node, Project, Template,
};

pub type Gns3Result<T> = Result<T, Gns3Error>;

#[derive(Debug)]
pub enum Gns3Error {
    /// Transport-level failure: connect, timeout or body decode.
    Http(reqwest::Error),
    /// The emulator answered with a non-success status.
    Remote { status: u16, body: String },
    /// No template on the emulator matches the requested name.
    TemplateNotFound(String),
}

impl fmt::Display for Gns3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gns3Error::Http(e) => write!(f, "emulator request failed: {e}"),
            Gns3Error::Remote { status, body } => {
                write!(f, "emulator returned {status}: {body}")
            }
            Gns3Error::TemplateNotFound(name) => {
                write!(f, "no template named '{name}' on the emulator")
            }
        }
    }
}

impl std::error::Error for Gns3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Gns3Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Gns3Error {
    fn from(value: reqwest::Error) -> Self {
        Gns3Error::Http(value)
    }
}

pub struct Gns3Client {
    http: reqwest::Client,
    base_url: String,
}

impl Gns3Client {
    pub fn new(config: &EmulatorConfig) -> Self {
        Gns3Client {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to construct HTTP client!"),
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Gns3Result<T> {
        debug!("GET /v2/{path}");
        let response = self.http.get(self.url(path)).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Gns3Result<T> {
        debug!("POST /v2/{path}");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn expect_success(response: reqwest::Response) -> Gns3Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Gns3Error::Remote {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> Gns3Result<Project> {
        self.post("projects", request).await
    }

    pub async fn list_projects(&self) -> Gns3Result<Vec<Project>> {
        self.get("projects").await
    }

    pub async fn list_templates(&self) -> Gns3Result<Vec<Template>> {
        self.get("templates").await
    }

    /// Looks a template up by name, case-insensitively. Emulator installs
    /// differ in capitalization ("VPCS" vs "vpcs"), the topologies we build
    /// should not.
    pub async fn find_template(&self, name: &str) -> Gns3Result<Template> {
        let templates = self.list_templates().await?;
        templates
            .into_iter()
            .find(|template| template.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Gns3Error::TemplateNotFound(name.to_string()))
    }

    pub async fn create_node(
        &self,
        project_id: &str,
        request: &CreateNodeRequest,
    ) -> Gns3Result<Node> {
        self.post(&format!("projects/{project_id}/nodes"), request)
            .await
    }

    pub async fn create_link(
        &self,
        project_id: &str,
        request: &CreateLinkRequest,
    ) -> Gns3Result<Link> {
        self.post(&format!("projects/{project_id}/links"), request)
            .await
    }

    /// Writes a file into a node's working directory. The emulator answers
    /// with an empty body on success, so there is nothing to decode.
    pub async fn upload_node_file(
        &self,
        project_id: &str,
        node_id: &str,
        file_name: &str,
        content: &str,
    ) -> Gns3Result<()> {
        let path = format!("projects/{project_id}/nodes/{node_id}/files/{file_name}");
        debug!("POST /v2/{path}");
        let response = self
            .http
            .post(self.url(&path))
            .header(CONTENT_TYPE, "text/plain")
            .body(content.to_string())
            .send()
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    pub async fn list_nodes(&self, project_id: &str) -> Gns3Result<Vec<Node>> {
        self.get(&format!("projects/{project_id}/nodes")).await
    }
}
