//! HTTP boundary for command bodies.
//!
//! [`HttpClient`] is the seam commands talk to: it takes a
//! [`RequestDescriptor`] and returns the decoded JSON body or a tagged
//! [`RequestError`]. [`RestClient`] is the reqwest implementation used by
//! the binary.
//!
//! Token lifecycle:
//! - Lazy acquisition: the first request to a resource origin (Graph, a
//!   SharePoint tenant) that finds no cached token triggers
//!   `refresh_token()` for that origin.
//! - Expiry-aware: `TokenProvider::token()` returns `None` once the cached
//!   token has expired, which triggers a fresh refresh on the next request.
//! - No retry: a 401 or any other non-2xx status is returned to the caller
//!   as `RequestError::Http` immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::RequestError;
use crate::request::RequestDescriptor;

/// Connect timeout. Covers TCP + TLS handshake only.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout, including the response body download.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends request descriptors and decodes their responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, RequestError>;
}

fn build_api_client() -> Client {
    Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(API_REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

/// Authenticated HTTP client for Microsoft Graph and SharePoint REST.
///
/// `auth` is behind a `Mutex` because `refresh_token()` requires `&mut self`.
/// The lock is held only for the token check/refresh, never across the API
/// round-trip.
pub struct RestClient {
    client: Client,
    auth: Mutex<TokenProvider>,
}

impl RestClient {
    pub fn new(auth: TokenProvider) -> Self {
        RestClient {
            client: build_api_client(),
            auth: Mutex::new(auth),
        }
    }

    /// Returns a valid bearer token for `resource`, refreshing if none is
    /// cached or the cached one has expired.
    async fn bearer_token(&self, resource: &str) -> Result<String, RequestError> {
        let mut auth = self.auth.lock().await;
        if auth.token(resource).is_none() {
            auth.refresh_token(resource).await?;
        }

        auth.token(resource)
            .map(str::to_owned)
            .ok_or_else(|| RequestError::Auth {
                message: format!("token missing after refresh for {resource}"),
            })
    }
}

#[async_trait]
impl HttpClient for RestClient {
    async fn send(&self, request: RequestDescriptor) -> Result<Value, RequestError> {
        let url = Url::parse(&request.url)
            .map_err(|e| RequestError::Raw(format!("Invalid request URL '{}': {e}", request.url)))?;
        let resource = url.origin().ascii_serialization();
        let token = self.bearer_token(&resource).await?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .bearer_auth(token);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            body = ?request.body,
            "sending request"
        );
        let response = builder.send().await?;

        // Read the body before checking status so OData error details
        // survive into the error.
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, %body, "received response");

        if !status.is_success() {
            return Err(RequestError::Http { status, body });
        }

        request.response_type.decode(&body)
    }
}
