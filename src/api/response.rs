//! Response envelope decoding
//!
//! Every Azkaban AJAX response is a JSON object. An `error` key means the
//! call failed; otherwise the fields depend on the request kind. A success
//! body that lacks an expected field is treated as a failure too.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Body of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Opaque session token
    pub session_id: String,
}

/// Body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    /// New project version
    pub version: String,
    /// Server-side project id, when reported
    pub project_id: Option<String>,
}

/// Body of a successful schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResponse {
    /// Human-readable confirmation
    pub message: String,
    /// Id of the created or updated schedule
    pub schedule_id: String,
}

/// Body of a successful execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResponse {
    /// Human-readable confirmation
    pub message: String,
    /// Execution id, when reported
    pub exec_id: Option<String>,
}

impl LoginResponse {
    /// Decode a login response body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the body carries `error`, or
    /// [`Error::MissingField`] if `session.id` is absent
    pub fn decode(body: &Value) -> Result<Self> {
        let obj = check_error(body)?;
        Ok(Self {
            session_id: required(obj, "session.id")?,
        })
    }
}

impl UploadResponse {
    /// Decode an upload response body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the body carries `error`, or
    /// [`Error::MissingField`] if `version` is absent
    pub fn decode(body: &Value) -> Result<Self> {
        let obj = check_error(body)?;
        Ok(Self {
            version: required(obj, "version")?,
            project_id: optional(obj, "projectId"),
        })
    }
}

impl ScheduleResponse {
    /// Decode a schedule response body
    ///
    /// Azkaban has two failure channels here: the usual `error` key, and a
    /// `status` of `"error"` with the reason in `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`], [`Error::Schedule`] or [`Error::MissingField`]
    pub fn decode(body: &Value) -> Result<Self> {
        let obj = check_error(body)?;

        if optional(obj, "status").as_deref() == Some("error") {
            let message =
                optional(obj, "message").unwrap_or_else(|| "unknown schedule error".to_string());
            return Err(Error::Schedule(message));
        }

        Ok(Self {
            message: required(obj, "message")?,
            schedule_id: required(obj, "scheduleId")?,
        })
    }
}

impl ExecuteResponse {
    /// Decode an execute response body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the body carries `error`, or
    /// [`Error::MissingField`] if `message` is absent
    pub fn decode(body: &Value) -> Result<Self> {
        let obj = check_error(body)?;
        Ok(Self {
            message: required(obj, "message")?,
            exec_id: optional(obj, "execid"),
        })
    }
}

/// Reject non-object bodies and bodies carrying an `error` key
fn check_error(body: &Value) -> Result<&Map<String, Value>> {
    let obj = body
        .as_object()
        .ok_or_else(|| Error::InvalidResponse(format!("expected a JSON object, got {body}")))?;

    if let Some(error) = obj.get("error") {
        return Err(Error::Api(scalar_to_string(error)));
    }

    Ok(obj)
}

fn required(obj: &Map<String, Value>, key: &'static str) -> Result<String> {
    optional(obj, key).ok_or(Error::MissingField(key))
}

fn optional(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .filter(|v| !v.is_null())
        .map(scalar_to_string)
}

// Azkaban sends ids and versions as numbers on some releases
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
