//! Session manager
//!
//! [`Azkaban`] holds the logged session (host + session id) and turns each
//! user intent into a request through an [`AzkabanApi`]. Every operation
//! logs its outcome; failures are also returned as typed errors so callers
//! can tell a transport failure from an API or scheduling error. Callers
//! that only need success or failure can use `is_ok()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::{
    AzkabanApi, ExecuteResponse, HttpApi, LoginResponse, ScheduleResponse, UploadResponse,
};
use crate::archive::{self, ProjectArchive};
use crate::config::ClientConfig;
use crate::{Error, Result};

/// An authenticated session against one Azkaban host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedSession {
    /// Normalized host
    pub host: String,
    /// Session id returned by login
    pub session_id: String,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Project name used for the upload
    pub project: String,
    /// Version assigned by the server
    pub version: String,
}

/// Result of a successful schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Server confirmation message
    pub message: String,
    /// Schedule id
    pub schedule_id: String,
}

/// Result of a successful execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOutcome {
    /// Server confirmation message
    pub message: String,
    /// Execution id, when reported
    pub exec_id: Option<String>,
}

/// Azkaban client with session state
#[derive(Debug)]
pub struct Azkaban<A = HttpApi> {
    api: A,
    session: Option<LoggedSession>,
    archive_dir: PathBuf,
}

impl Azkaban<HttpApi> {
    /// Create a client talking HTTP(S) with the given settings
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_api(HttpApi::new(config)?))
    }
}

impl<A: AzkabanApi> Azkaban<A> {
    /// Create a client over an arbitrary request layer
    ///
    /// Archives are written to the current directory.
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            session: None,
            archive_dir: PathBuf::from("."),
        }
    }

    /// Write project archives to `dir` instead of the current directory
    #[must_use]
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    /// The request layer
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The logged session, if any
    pub const fn get_logged_session(&self) -> Option<&LoggedSession> {
        self.session.as_ref()
    }

    /// Replace the logged session; `None` clears it
    pub fn set_logged_session(&mut self, session: Option<LoggedSession>) {
        self.session = session;
    }

    /// Forget the logged session
    pub fn logout(&mut self) {
        self.set_logged_session(None);
    }

    /// Log in to `host`
    ///
    /// The stored session only changes when login succeeds; any failure
    /// leaves the previous session in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the host is unreachable,
    /// [`Error::Api`] on bad credentials
    pub fn login(&mut self, host: &str, user: &str, password: &str) -> Result<()> {
        let host = validate_host(host);

        let response = self
            .api
            .login_request(&host, user, password)
            .and_then(|body| LoginResponse::decode(&body))
            .inspect_err(log_failure)?;

        self.set_logged_session(Some(LoggedSession {
            host,
            session_id: response.session_id,
        }));

        tracing::info!("logged in as {user}");
        Ok(())
    }

    /// Zip the directory at `path` and upload it as a project
    ///
    /// `project` defaults to the directory name and `zip_name` to the
    /// project name. The archive is deleted once the request returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without any I/O when logged out,
    /// [`Error::Archive`] if `path` is not a directory, or the request or
    /// API error otherwise
    pub fn upload(
        &self,
        path: &Path,
        project: Option<&str>,
        zip_name: Option<&str>,
    ) -> Result<UploadOutcome> {
        let session = self.require_session()?;

        let project = match project.filter(|p| !p.is_empty()) {
            Some(project) => project.to_string(),
            None => archive::default_project_name(path).inspect_err(log_failure)?,
        };
        let zip_name = zip_name
            .filter(|z| !z.is_empty())
            .map_or_else(|| project.clone(), ToString::to_string);

        let archive =
            ProjectArchive::create(path, &zip_name, &self.archive_dir).inspect_err(log_failure)?;

        let body = self.api.upload_request(
            &session.host,
            &session.session_id,
            &project,
            archive.path(),
        );
        drop(archive);

        let response = body
            .and_then(|body| UploadResponse::decode(&body))
            .inspect_err(log_failure)?;

        tracing::info!("project {project} updated to version {}", response.version);
        Ok(UploadOutcome {
            project,
            version: response.version,
        })
    }

    /// Schedule `flow` of `project` with a quartz cron expression
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when logged out, [`Error::Api`] for an
    /// `error` response, [`Error::Schedule`] when the server rejects the
    /// schedule
    pub fn schedule(&self, project: &str, flow: &str, cron: &str) -> Result<ScheduleOutcome> {
        let session = self.require_session()?;

        let response = self
            .api
            .schedule_request(&session.host, &session.session_id, project, flow, cron)
            .and_then(|body| ScheduleResponse::decode(&body))
            .inspect_err(log_failure)?;

        tracing::info!("{}", response.message);
        tracing::info!("scheduleId: {}", response.schedule_id);
        Ok(ScheduleOutcome {
            message: response.message,
            schedule_id: response.schedule_id,
        })
    }

    /// Run `flow` of `project` now
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] when logged out, or the request or API
    /// error otherwise
    pub fn execute(&self, project: &str, flow: &str) -> Result<ExecuteOutcome> {
        let session = self.require_session()?;

        let response = self
            .api
            .execute_request(&session.host, &session.session_id, project, flow)
            .and_then(|body| ExecuteResponse::decode(&body))
            .inspect_err(log_failure)?;

        tracing::info!("{}", response.message);
        if let Some(exec_id) = &response.exec_id {
            tracing::debug!(exec_id = %exec_id, project, flow, "execution submitted");
        }
        Ok(ExecuteOutcome {
            message: response.message,
            exec_id: response.exec_id,
        })
    }

    fn require_session(&self) -> Result<&LoggedSession> {
        self.session.as_ref().ok_or(Error::NotLoggedIn).inspect_err(log_failure)
    }
}

/// Strip every trailing `/` from a host string
#[must_use]
pub fn validate_host(host: &str) -> String {
    host.trim_end_matches('/').to_string()
}

fn log_failure(error: &Error) {
    tracing::error!("{error}");
}
