//! Typed error hierarchy for the m365 command pipeline.
//!
//! Two layers:
//! - [`RequestError`] is the closed set of failure shapes produced at the
//!   HTTP boundary (bare string rejections, non-2xx responses with their
//!   body, transport failures, malformed bodies, token failures).
//! - [`CommandError`] is the single normalized error every invocation
//!   surfaces to the caller. Its `Display` is the user-facing message.
//!
//! [`normalize`] converts the first into the second. The conversion is an
//! exhaustive match, and `From<RequestError> for CommandError` delegates to
//! it so that `?` on any HTTP call routes through the normalizer.

use reqwest::StatusCode;
use serde_json::Value;

/// Failure shapes produced by an [`HttpClient`](crate::client::HttpClient).
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// A bare string rejection. May itself contain a JSON error body.
    #[error("{0}")]
    Raw(String),

    /// The API returned a non-success status code. The body is preserved
    /// verbatim because it carries the OData error detail.
    #[error("API error {status}: {body}")]
    Http {
        /// HTTP status returned by the API.
        status: StatusCode,
        /// Raw response body, empty if none was sent.
        body: String,
    },

    /// DNS, TCP, TLS or timeout failure. No status code is available.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded as JSON.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The token endpoint rejected the credentials or could not be reached.
    #[error("authentication failed: {message}")]
    Auth {
        /// Status and Azure AD error text when available.
        message: String,
    },
}

/// Failure category of a [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or conflicting arguments. Reported before any network call.
    Validation,
    /// A required remote resource or configuration is missing.
    Precondition,
    /// Non-2xx response, network failure or malformed response body.
    Transport,
    /// Anything else.
    Unexpected,
}

/// The normalized error surfaced by every failed invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CommandError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Single human-readable message.
    pub message: String,
    /// Service error code (e.g. `Request_ResourceNotFound`), when present.
    pub code: Option<String>,
    /// Raw response body, when the failure came from an HTTP response.
    pub body: Option<String>,
}

impl CommandError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CommandError {
            kind,
            message: message.into(),
            code: None,
            body: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        normalize(err)
    }
}

/// Converts a transport-boundary error into the normalized error.
///
/// Message precedence: the most specific OData detail found in the body,
/// then the generic HTTP status text, then the raw string form.
pub fn normalize(err: RequestError) -> CommandError {
    match err {
        RequestError::Raw(raw) => match serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|v| odata_detail(&v))
        {
            Some(detail) => CommandError {
                kind: ErrorKind::Transport,
                message: detail.message,
                code: detail.code,
                body: Some(raw),
            },
            None => CommandError::new(ErrorKind::Transport, raw),
        },
        RequestError::Http { status, body } => {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| odata_detail(&v));
            let (message, code) = match detail {
                Some(detail) => (detail.message, detail.code),
                None => (status_text(status), None),
            };
            CommandError {
                kind: ErrorKind::Transport,
                message,
                code,
                body: (!body.is_empty()).then_some(body),
            }
        }
        RequestError::Network(e) => CommandError::new(ErrorKind::Transport, e.to_string()),
        RequestError::Parse(e) => {
            CommandError::new(ErrorKind::Transport, format!("Malformed response body: {e}"))
        }
        RequestError::Auth { message } => CommandError::new(
            ErrorKind::Transport,
            format!("Authentication failed: {message}"),
        ),
    }
}

/// Most specific message in a JSON error body, if it has one.
pub(crate) fn body_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| odata_detail(&v))
        .map(|detail| detail.message)
}

struct ODataDetail {
    message: String,
    code: Option<String>,
}

/// Extracts the most specific message from a structured error body.
fn odata_detail(body: &Value) -> Option<ODataDetail> {
    let str_at = |pointer: &str| body.pointer(pointer).and_then(Value::as_str);

    if let Some(message) = str_at("/odata.error/message/value") {
        return Some(ODataDetail {
            message: message.to_string(),
            code: str_at("/odata.error/code").map(str::to_string),
        });
    }

    let code = str_at("/error/code").map(str::to_string);
    if let Some(message) = str_at("/error/message/value").or_else(|| str_at("/error/message")) {
        return Some(ODataDetail {
            message: message.to_string(),
            code,
        });
    }

    str_at("/message")
        .or_else(|| str_at("/error_description"))
        .map(|message| ODataDetail {
            message: message.to_string(),
            code: code.or_else(|| str_at("/error").map(str::to_string)),
        })
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!(
            "Request failed with status code {} ({reason})",
            status.as_u16()
        ),
        None => format!("Request failed with status code {}", status.as_u16()),
    }
}

/// A command declaration that violates the registry's invariants.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("command '{0}' is registered more than once")]
    DuplicateCommand(String),

    #[error("command '{command}' declares option name '{name}' more than once")]
    DuplicateOption { command: String, name: String },

    #[error("command '{command}' has option set member '{name}' that is not a declared option")]
    UnknownSetMember { command: String, name: String },
}

/// Configuration file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
