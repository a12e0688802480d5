//! Connection context passed into every invocation.
//!
//! A [`Session`] carries the connected flag and the resource base URLs. It
//! is built once per process from the merged [`Config`] and handed to
//! commands through [`CommandContext`](crate::command::CommandContext);
//! commands only read it.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com";

/// Contents of the TOML configuration file. Every field is optional so
/// that CLI flags and environment variables can fill the gaps.
///
/// ```toml
/// tenant_id = "contoso.onmicrosoft.com"
/// client_id = "00000000-0000-0000-0000-000000000000"
/// spo_url = "https://contoso.sharepoint.com"
/// ```
///
/// The client secret is never read from this file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub graph_url: Option<String>,
    pub spo_url: Option<String>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Field-wise merge; values in `overrides` win.
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            tenant_id: overrides.tenant_id.or(self.tenant_id),
            client_id: overrides.client_id.or(self.client_id),
            graph_url: overrides.graph_url.or(self.graph_url),
            spo_url: overrides.spo_url.or(self.spo_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    connected: bool,
    graph_url: String,
    spo_url: Option<String>,
}

impl Session {
    pub fn connected(graph_url: &str, spo_url: Option<&str>) -> Self {
        Session {
            connected: true,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            spo_url: spo_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn disconnected() -> Self {
        Session {
            connected: false,
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            spo_url: None,
        }
    }

    /// Connected when tenant, client id and secret are all known.
    pub fn from_config(config: &Config, has_secret: bool) -> Self {
        let graph_url = config.graph_url.as_deref().unwrap_or(DEFAULT_GRAPH_URL);
        let mut session = Session::connected(graph_url, config.spo_url.as_deref());
        session.connected = has_secret && config.tenant_id.is_some() && config.client_id.is_some();
        session
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Microsoft Graph base URL without trailing slash.
    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    /// SharePoint tenant root URL, when configured.
    pub fn spo_url(&self) -> Option<&str> {
        self.spo_url.as_deref()
    }
}
