//! Runtime configuration: defaults, then `CAMPUS_*` environment variables, then CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{PortalError, PortalResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "CAMPUS_API_URL";
pub const ENV_SESSION_FILE: &str = "CAMPUS_SESSION_FILE";
pub const ENV_TIMEOUT_SECS: &str = "CAMPUS_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
}

/// Values supplied on the command line; `None` defers to env/defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub session_file: Option<String>,
    pub timeout_secs: Option<String>,
}

impl PortalConfig {
    pub fn from_env() -> PortalResult<Self> { Self::resolve(&ConfigOverrides::default()) }

    pub fn resolve(args: &ConfigOverrides) -> PortalResult<Self> {
        Self::resolve_with(args, |k| std::env::var(k).ok())
    }

    /// Resolution with an injectable environment lookup.
    pub fn resolve_with<F>(args: &ConfigOverrides, env: F) -> PortalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |arg: &Option<String>, key: &str| {
            arg.clone().or_else(|| env(key)).filter(|s| !s.trim().is_empty())
        };

        let api_raw = pick(&args.api_url, ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&api_raw)?;

        let session_file = pick(&args.session_file, ENV_SESSION_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let request_timeout = match pick(&args.timeout_secs, ENV_TIMEOUT_SECS) {
            Some(s) => {
                let secs: u64 = s.trim().parse().map_err(|_| PortalError::config(format!("invalid timeout '{}'", s)))?;
                if secs == 0 { return Err(PortalError::config("timeout must be at least 1 second")); }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, session_file, request_timeout })
    }
}

/// Parse and normalise the API base so relative endpoint paths join beneath it.
pub fn parse_api_url(raw: &str) -> PortalResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| PortalError::config(format!("invalid API URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(PortalError::config(format!("unsupported API URL scheme '{}'", other))),
    }
    if !url.path().ends_with('/') {
        let p = format!("{}/", url.path());
        url.set_path(&p);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub fn default_session_file() -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    let base = home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    base.join(".campus_portal").join("session.json")
}
