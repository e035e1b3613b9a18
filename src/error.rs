//! Unified client error model.
//! Every remote call, the session store and configuration report through `PortalError`,
//! so views can render one inline message regardless of where a failure started.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PortalError {
    /// No credential, or the backend rejected the one attached (401/403).
    /// `status` is 0 when the check failed locally and nothing was sent.
    #[error("{code}: {message}")]
    Unauthorized { status: u16, code: String, message: String },
    /// Transport failure: the request never produced a response.
    #[error("{code}: {message}")]
    Network { code: String, message: String },
    /// Payload rejected, either by the backend (400/422) or locally (status 0).
    #[error("{code}: {message}")]
    Validation { status: u16, code: String, message: String },
    /// Any other non-success status.
    #[error("{code}: {message}")]
    Remote { status: u16, code: String, message: String },
    #[error("{code}: {message}")]
    Storage { code: String, message: String },
    #[error("{code}: {message}")]
    Config { code: String, message: String },
}

impl PortalError {
    pub fn code_str(&self) -> &str {
        match self {
            PortalError::Unauthorized { code, .. }
            | PortalError::Network { code, .. }
            | PortalError::Validation { code, .. }
            | PortalError::Remote { code, .. }
            | PortalError::Storage { code, .. }
            | PortalError::Config { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            PortalError::Unauthorized { message, .. }
            | PortalError::Network { message, .. }
            | PortalError::Validation { message, .. }
            | PortalError::Remote { message, .. }
            | PortalError::Storage { message, .. }
            | PortalError::Config { message, .. } => message.as_str(),
        }
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self { PortalError::Unauthorized { status: 0, code: "unauthorized".into(), message: msg.into() } }
    pub fn network<S: Into<String>>(msg: S) -> Self { PortalError::Network { code: "network_error".into(), message: msg.into() } }
    pub fn validation<S: Into<String>>(status: u16, msg: S) -> Self { PortalError::Validation { status, code: "validation_error".into(), message: msg.into() } }
    pub fn remote<S: Into<String>>(status: u16, msg: S) -> Self { PortalError::Remote { status, code: "remote_error".into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(msg: S) -> Self { PortalError::Storage { code: "session_storage".into(), message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { PortalError::Config { code: "config_error".into(), message: msg.into() } }

    /// Classify a non-success HTTP response. `body` is the raw response text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = detail_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { reason_phrase(status).to_string() } else { trimmed.to_string() }
        });
        match status {
            401 | 403 => PortalError::Unauthorized { status, code: "unauthorized".into(), message },
            400 | 422 => PortalError::validation(status, message),
            _ => PortalError::remote(status, message),
        }
    }

    /// HTTP status preserved from the remote call, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PortalError::Unauthorized { status, .. }
            | PortalError::Validation { status, .. }
            | PortalError::Remote { status, .. }
                if *status != 0 =>
            {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool { matches!(self, PortalError::Unauthorized { .. }) }
}

pub type PortalResult<T> = Result<T, PortalError>;

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return PortalError::from_status(status.as_u16(), "");
        }
        if err.is_decode() {
            return PortalError::Remote { status: 0, code: "decode_error".into(), message: err.to_string() };
        }
        PortalError::network(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self { PortalError::storage(err.to_string()) }
}

// FastAPI-style bodies: {"detail": "..."} or {"detail": [{"msg": "..."}, ...]}
fn detail_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    match v.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|it| it.get("msg").and_then(|m| m.as_str()).map(str::to_string))
                .collect();
            if msgs.is_empty() { None } else { Some(msgs.join("; ")) }
        }
        other => Some(other.to_string()),
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
}
