//! Azkaban AJAX API request layer
//!
//! Builds and sends the four requests the session manager needs. Every call
//! receives the host and session id explicitly; the only state kept here is
//! the reusable HTTP client (connection pool and cookie jar).

pub mod response;

use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::{Error, Result};

pub use response::{ExecuteResponse, LoginResponse, ScheduleResponse, UploadResponse};

/// The requests the session manager sends to Azkaban
///
/// Each method returns the parsed JSON body. Interpreting the body (the
/// `error` key, operation-specific fields) is left to the caller.
pub trait AzkabanApi {
    /// Authenticate and obtain a session id
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable or the body is not JSON
    fn login_request(&self, host: &str, user: &str, password: &str) -> Result<Value>;

    /// Upload a zipped project
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read, the host is
    /// unreachable or the body is not JSON
    fn upload_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        zip_path: &Path,
    ) -> Result<Value>;

    /// Schedule a flow with a quartz cron expression
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable or the body is not JSON
    fn schedule_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        flow: &str,
        cron: &str,
    ) -> Result<Value>;

    /// Trigger an ad-hoc flow execution
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable or the body is not JSON
    fn execute_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        flow: &str,
    ) -> Result<Value>;
}

/// [`AzkabanApi`] over HTTP(S) using a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
}

impl HttpApi {
    /// Create a new HTTP request layer
    ///
    /// Certificate verification is configured on this client only; other
    /// clients in the process are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TLS backend cannot be initialized
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if config.accept_invalid_certs {
            tracing::debug!("TLS certificate verification disabled for this client");
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl AzkabanApi for HttpApi {
    fn login_request(&self, host: &str, user: &str, password: &str) -> Result<Value> {
        tracing::debug!(host, user, "sending login request");

        let response = self
            .client
            .post(host)
            .form(&[("action", "login"), ("username", user), ("password", password)])
            .send()?;

        read_json(response)
    }

    fn upload_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        zip_path: &Path,
    ) -> Result<Value> {
        let url = format!("{host}/manager");
        tracing::debug!(%url, project, zip = %zip_path.display(), "sending upload request");

        let file = zip_part(zip_path)?;
        let form = Form::new()
            .text("session.id", session_id.to_string())
            .text("ajax", "upload")
            .text("project", project.to_string())
            .part("file", file);

        let response = self.client.post(&url).multipart(form).send()?;

        read_json(response)
    }

    fn schedule_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        flow: &str,
        cron: &str,
    ) -> Result<Value> {
        let url = format!("{host}/schedule");
        tracing::debug!(%url, project, flow, cron, "sending schedule request");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("session.id", session_id),
                ("ajax", "scheduleCronFlow"),
                ("projectName", project),
                ("flow", flow),
                ("cronExpression", cron),
            ])
            .send()?;

        read_json(response)
    }

    fn execute_request(
        &self,
        host: &str,
        session_id: &str,
        project: &str,
        flow: &str,
    ) -> Result<Value> {
        let url = format!("{host}/executor");
        tracing::debug!(%url, project, flow, "sending execute request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("session.id", session_id),
                ("ajax", "executeFlow"),
                ("project", project),
                ("flow", flow),
            ])
            .send()?;

        read_json(response)
    }
}

/// Multipart file part for a project archive
fn zip_part(zip_path: &Path) -> Result<Part> {
    Part::file(zip_path)
        .map_err(|e| Error::Archive(format!("failed to read '{}': {e}", zip_path.display())))?
        .mime_str("application/zip")
        .map_err(|e| Error::Archive(format!("invalid archive content type: {e}")))
}

/// Parse a response body as JSON
///
/// Azkaban reports failures inside the body, so the status code is only
/// used to annotate bodies that fail to parse.
fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text()?;

    serde_json::from_str(&body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        Error::InvalidResponse(format!("HTTP {status}: {e}: {snippet}"))
    })
}
