//! HTTP transport shared by all resource services.
//!
//! Wraps a `reqwest::Client` bound to the configured API base. Each request reads the
//! current credential from the session store and attaches it as an `Authorization`
//! header; non-success statuses are classified into `PortalError`. No retries.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::session::{Credential, SessionStore};

/// Whether a call must carry a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach the credential when one is stored.
    Optional,
    /// Fail with `Unauthorized` before sending when nothing is stored.
    Required,
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(cfg: &PortalConfig, store: Arc<dyn SessionStore>) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| PortalError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base: cfg.api_url.clone(), client, store })
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> { &self.store }

    fn url(&self, path: &str) -> PortalResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| PortalError::config(format!("invalid request path '{}': {}", path, e)))
    }

    async fn send(&self, method: Method, path: &str, auth: AuthMode, build: impl FnOnce(RequestBuilder) -> RequestBuilder) -> PortalResult<reqwest::Response> {
        let url = self.url(path)?;
        let mut req = self.client.request(method.clone(), url);
        match self.store.get() {
            Some(cred) => {
                let hv = HeaderValue::from_str(&authorization_value(&cred))
                    .map_err(|_| PortalError::unauthorized("stored credential is not a valid header value"))?;
                req = req.header(AUTHORIZATION, hv);
            }
            None if auth == AuthMode::Required => {
                return Err(PortalError::unauthorized("not logged in"));
            }
            None => {}
        }
        let resp = build(req).send().await.map_err(|e| PortalError::network(e.to_string()))?;
        let status = resp.status();
        debug!(target: "campus_portal::api", "{} {} -> {}", method, path, status.as_u16());
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(PortalError::from_status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> PortalResult<T> {
        let status = resp.status().as_u16();
        resp.json::<T>().await.map_err(|e| PortalError::Remote {
            status,
            code: "decode_error".into(),
            message: format!("unexpected response body: {}", e),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)], auth: AuthMode) -> PortalResult<T> {
        let resp = self.send(Method::GET, path, auth, |r| if query.is_empty() { r } else { r.query(query) }).await?;
        Self::decode(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> PortalResult<T> {
        let resp = self.send(Method::POST, path, AuthMode::Optional, |r| r.json(body)).await?;
        Self::decode(resp).await
    }

    /// `application/x-www-form-urlencoded` POST (OAuth2 password flow).
    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> PortalResult<T> {
        let resp = self.send(Method::POST, path, AuthMode::Optional, |r| r.form(form)).await?;
        Self::decode(resp).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> PortalResult<T> {
        let resp = self.send(Method::PUT, path, AuthMode::Optional, |r| r.json(body)).await?;
        Self::decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> PortalResult<()> {
        self.send(Method::DELETE, path, AuthMode::Optional, |r| r).await?;
        Ok(())
    }
}

/// `Bearer <token>`; other token types are passed through as issued.
pub fn authorization_value(cred: &Credential) -> String {
    let kind = if cred.token_type.is_empty() || cred.token_type.eq_ignore_ascii_case("bearer") {
        "Bearer"
    } else {
        cred.token_type.as_str()
    };
    format!("{} {}", kind, cred.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        let cfg = PortalConfig {
            api_url: crate::config::parse_api_url(base).unwrap(),
            session_file: "unused".into(),
            request_timeout: std::time::Duration::from_secs(1),
        };
        ApiClient::new(&cfg, Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn bearer_prefix_is_normalized() {
        assert_eq!(authorization_value(&Credential::bearer("abc")), "Bearer abc");
        let c = Credential { access_token: "x".into(), token_type: "MAC".into() };
        assert_eq!(authorization_value(&c), "MAC x");
    }

    #[test]
    fn paths_join_under_base_path() {
        let c = client("http://host.example/api");
        assert_eq!(c.url("/bus/").unwrap().as_str(), "http://host.example/api/bus/");
        assert_eq!(c.url("timetable/Monday").unwrap().as_str(), "http://host.example/api/timetable/Monday");
    }

    #[tokio::test]
    async fn required_auth_fails_without_network_call() {
        // Port 9 (discard) is never contacted: the missing credential short-circuits.
        let c = client("http://127.0.0.1:9");
        let err = c.get_json::<serde_json::Value>("auth/me", &[], AuthMode::Required).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
