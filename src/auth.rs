//! App-only sign-in against the Microsoft identity platform.
//!
//! Tokens come from `<authority>/oauth2/v2.0/token` with the
//! client_credentials grant. Microsoft Graph and SharePoint are separate
//! resources, so tokens are cached per resource origin with scope
//! `<origin>/.default`. Consumers (e.g. `RestClient`) read the cached token
//! via `token()` and call `refresh_token()` when it is absent or stale.

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{RequestError, body_message};

/// Azure AD authority. `{tenant_id}` is replaced at runtime.
const AUTHORITY: &str = "https://login.microsoftonline.com/{tenant_id}";

/// Token request, sent form-encoded.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

/// The fields of a token response this crate reads. Anything else in the
/// payload is ignored.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// Seconds before `expires_in` runs out at which a cached token counts as
/// stale.
const EXPIRY_BUFFER_SECS: u64 = 60;

struct CachedToken {
    response: TokenResponse,
    acquired_at: Instant,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        let lifetime = self.response.expires_in.saturating_sub(EXPIRY_BUFFER_SECS);
        self.acquired_at.elapsed().as_secs() >= lifetime
    }
}

/// Manages OAuth2 token acquisition and caching, one token per resource.
///
/// Invariants:
/// - `token(resource)` returns `None` until `refresh_token(resource)` has
///   succeeded, and again once that token expires (60 s buffer).
/// - A fixed token set by `with_token` is returned for every resource.
pub struct TokenProvider {
    client: reqwest::Client,
    authority: String,
    client_id: String,
    client_secret: String,
    tokens: HashMap<String, CachedToken>,
    fixed: Option<String>,
}

impl TokenProvider {
    pub fn new(tenant_id: &str, client_id: &str, client_secret: &str) -> Self {
        Self::with_authority(
            &AUTHORITY.replace("{tenant_id}", tenant_id),
            client_id,
            client_secret,
        )
    }

    /// Constructor that accepts a custom authority URL, used by tests to
    /// point at a local mock token endpoint.
    pub fn with_authority(authority: &str, client_id: &str, client_secret: &str) -> Self {
        TokenProvider {
            client: reqwest::Client::new(),
            authority: authority.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            tokens: HashMap::new(),
            fixed: None,
        }
    }

    /// Provider that hands out `token` for every resource and never calls
    /// the token endpoint.
    pub fn with_token(token: &str) -> Self {
        TokenProvider {
            fixed: Some(token.to_string()),
            ..Self::with_authority("", "", "")
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority)
    }

    /// Fetches a new token for `resource` from Azure AD and caches it.
    ///
    /// On failure the message is the Azure AD error description when the
    /// response carries one, otherwise the status and raw body.
    pub async fn refresh_token(&mut self, resource: &str) -> Result<(), RequestError> {
        if self.fixed.is_some() {
            return Ok(());
        }

        let scope = format!("{resource}/.default");
        let body = TokenRequest {
            client_id: &self.client_id,
            scope: &scope,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
        };

        tracing::debug!(%resource, "requesting access token");
        let response = self
            .client
            .post(self.token_url())
            .form(&body)
            .send()
            .await
            .map_err(|e| RequestError::Auth {
                message: format!("token endpoint unreachable: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RequestError::Auth {
            message: format!("failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            return Err(RequestError::Auth {
                message: body_message(&body)
                    .unwrap_or_else(|| format!("token request failed ({status}): {body}")),
            });
        }

        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| RequestError::Auth {
                message: format!("failed to parse token response: {e}"),
            })?;
        self.tokens.insert(
            resource.to_string(),
            CachedToken {
                response,
                acquired_at: Instant::now(),
            },
        );

        Ok(())
    }

    /// Returns the cached access token for `resource`, or `None` if no token
    /// exists or the token has expired.
    pub fn token(&self, resource: &str) -> Option<&str> {
        if let Some(fixed) = &self.fixed {
            return Some(fixed);
        }
        self.tokens
            .get(resource)
            .filter(|cached| !cached.is_expired())
            .map(|cached| cached.response.access_token.as_str())
    }
}
