//! AdGuard Home rewrite client implementation.

use crate::api::RewriteApi;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use syncdns_core::{Result, RewriteAuthority, RewriteRule, SyncError};
use tracing::{debug, instrument};
use url::Url;

/// Longest slice of an undecodable body kept in the error message
const BODY_SNIPPET_LEN: usize = 200;

/// Client for the rewrite endpoints of an AdGuard Home instance
#[derive(Clone)]
pub struct AuthorityClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
}

impl AuthorityClient {
    /// Create a builder for the given base URL and credentials
    #[must_use]
    pub fn builder(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AuthorityClientBuilder {
        AuthorityClientBuilder::new(base_url, username, password)
    }

    /// Access the rewrite endpoints
    #[must_use]
    pub fn rewrites(&self) -> RewriteApi<'_> {
        RewriteApi::new(self)
    }

    /// Base URL requests are made against, without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Perform a GET request and decode a JSON body
    #[instrument(skip(self), fields(authority = %self.inner.base_url))]
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Unreachable(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Perform a POST request with a JSON body, expecting no meaningful reply
    #[instrument(skip(self, body), fields(authority = %self.inner.base_url))]
    pub(crate) async fn post<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.build_url(path);
        debug!(url = %url, "POST request");

        let response = self
            .inner
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::Unreachable(e.to_string()))?;

        self.handle_empty_response(response).await
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Handle a response that carries a JSON body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::OK {
            let body = response
                .text()
                .await
                .map_err(|e| SyncError::Unreachable(e.to_string()))?;
            serde_json::from_str(&body).map_err(|e| {
                let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
                SyncError::BadResponse(format!("{e}; body: {snippet}"))
            })
        } else {
            self.handle_error(status, response).await
        }
    }

    /// Handle a response whose body is ignored on success
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if status == StatusCode::OK {
            Ok(())
        } else {
            self.handle_error(status, response).await
        }
    }

    /// Anything but 200 is a rejection
    async fn handle_error<T>(&self, status: StatusCode, response: reqwest::Response) -> Result<T> {
        let message = response.text().await.unwrap_or_default();

        Err(SyncError::Rejected {
            code: status.as_u16(),
            message: message.trim().to_string(),
        })
    }
}

#[async_trait]
impl RewriteAuthority for AuthorityClient {
    async fn list_rules(&self) -> Result<Vec<RewriteRule>> {
        self.rewrites().list().await
    }

    async fn create_rule(&self, rule: &RewriteRule) -> Result<()> {
        self.rewrites().add(rule).await
    }

    async fn delete_rule(&self, rule: &RewriteRule) -> Result<()> {
        self.rewrites().delete(rule).await
    }
}

/// Builder for configuring an [`AuthorityClient`]
pub struct AuthorityClientBuilder {
    base_url: String,
    username: String,
    password: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl AuthorityClientBuilder {
    /// Create a new builder for the given base URL and credentials
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: None,
            user_agent: format!("syncdns/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set a per-request timeout. Without one, requests wait indefinitely.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client.
    ///
    /// The Basic credential is encoded here once and sent as a default header
    /// on every request.
    pub fn build(self) -> Result<AuthorityClient> {
        let base_url = normalize_base_url(&self.base_url)?;

        let credentials = B64.encode(format!("{}:{}", self.username, self.password));
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| SyncError::Config(format!("invalid credentials header: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut http = HttpClient::builder()
            .default_headers(headers)
            .user_agent(&self.user_agent)
            .gzip(true);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(AuthorityClient {
            inner: Arc::new(ClientInner { http, base_url }),
        })
    }
}

/// Validate the base URL and strip any trailing slash
fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed =
        Url::parse(raw).map_err(|e| SyncError::Config(format!("invalid authority URL {raw:?}: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SyncError::Config(format!(
            "authority URL must be http or https, got {raw:?}"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
