//! Request Descriptor: the transient description of one REST call.
//!
//! Commands build descriptors and hand them to an
//! [`HttpClient`](crate::client::HttpClient). Identifiers interpolated into
//! URL paths go through [`encode_path_segment`], query values through
//! [`encode_query_value`].

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use reqwest::Method;
use serde_json::Value;

use crate::error::RequestError;

/// `accept` value for Microsoft Graph.
pub const ACCEPT_JSON: &str = "application/json";

/// `accept` value for SharePoint REST without OData metadata.
pub const ACCEPT_JSON_NOMETADATA: &str = "application/json;odata=nometadata";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes an identifier for use as a single URL path segment.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Like [`URI_COMPONENT`], but lists such as `$select=id,mail` stay readable.
const QUERY_VALUE: &AsciiSet = &URI_COMPONENT.remove(b',').remove(b'/');

/// Percent-encodes a query parameter value.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Inverse of [`encode_path_segment`]. Invalid UTF-8 is replaced.
pub fn decode_path_segment(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse as JSON. An empty body decodes to `null`.
    #[default]
    Json,
    /// Return the body as a JSON string.
    Text,
}

impl ResponseType {
    pub fn decode(self, body: &str) -> Result<Value, RequestError> {
        match self {
            ResponseType::Json if body.trim().is_empty() => Ok(Value::Null),
            ResponseType::Json => Ok(serde_json::from_str(body)?),
            ResponseType::Text => Ok(Value::String(body.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub response_type: ResponseType,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        RequestDescriptor {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            response_type: ResponseType::Json,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Header names are stored lowercase.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn accept(self, value: &str) -> Self {
        self.header("accept", value)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_name_round_trips_through_encoding() {
        for id in [
            "john@contoso.com",
            "o'neil#ext#@contoso.onmicrosoft.com",
            "a b/c?d&e=f%g",
            "jürgen@contoso.com",
        ] {
            let encoded = encode_path_segment(id);
            assert!(!encoded.contains('/'), "{encoded}");
            assert!(!encoded.contains('?'), "{encoded}");
            assert!(!encoded.contains('#'), "{encoded}");
            assert!(!encoded.contains(' '), "{encoded}");
            assert_eq!(decode_path_segment(&encoded), id);
        }
    }

    #[test]
    fn encoding_matches_uri_component_rules() {
        assert_eq!(encode_path_segment("john@contoso.com"), "john%40contoso.com");
        assert_eq!(
            encode_path_segment("68be84bf-a585-4776-80b3-30aa5207aa21"),
            "68be84bf-a585-4776-80b3-30aa5207aa21"
        );
        assert_eq!(encode_path_segment("it's (ok)!"), "it's%20(ok)!");
    }

    #[test]
    fn query_values_escape_separators_but_keep_lists() {
        assert_eq!(encode_query_value("id,mail"), "id,mail");
        assert_eq!(encode_query_value("id,a&b=c #d"), "id,a%26b%3Dc%20%23d");
        assert_eq!(decode_path_segment(&encode_query_value("x&y,z")), "x&y,z");
    }

    #[test]
    fn builder_sets_method_headers_and_body() {
        let request = RequestDescriptor::patch("https://graph.microsoft.com/v1.0/users/x")
            .accept(ACCEPT_JSON)
            .header("X-Custom", "1")
            .json(serde_json::json!({"AccountEnabled": true}));
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.headers["accept"], "application/json");
        assert_eq!(request.headers["x-custom"], "1");
        assert_eq!(request.body.unwrap()["AccountEnabled"], true);
    }

    #[test]
    fn json_decoding_handles_empty_and_malformed_bodies() {
        assert_eq!(ResponseType::Json.decode("").unwrap(), Value::Null);
        assert_eq!(
            ResponseType::Json.decode(r#"{"value":[]}"#).unwrap()["value"],
            serde_json::json!([])
        );
        assert!(matches!(
            ResponseType::Json.decode("<html>"),
            Err(RequestError::Parse(_))
        ));
        assert_eq!(
            ResponseType::Text.decode("plain").unwrap(),
            Value::String("plain".to_string())
        );
    }
}
