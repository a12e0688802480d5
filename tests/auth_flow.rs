//! Integration tests for token acquisition through `RestClient`.
//!
//! A single wiremock server plays both the Azure AD token endpoint and the
//! API, so the resource origin (and therefore the requested scope) is the
//! server's own address.

use m365_cli::auth::TokenProvider;
use m365_cli::client::{HttpClient, RestClient};
use m365_cli::error::{CommandError, RequestError};
use m365_cli::request::RequestDescriptor;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> RestClient {
    RestClient::new(TokenProvider::with_authority(
        &server.uri(),
        "cid-789",
        "s3cret",
    ))
}

#[tokio::test]
async fn token_is_acquired_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=cid-789"))
        .and(body_string_contains("%2F.default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "graph-token",
            "token_type": "Bearer",
            "expires_in": 3599,
            "ext_expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me"))
        .and(header("authorization", "Bearer graph-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(2)
        .mount(&server)
        .await;

    let http = client(&server);
    let url = format!("{}/v1.0/me", server.uri());
    for _ in 0..2 {
        let value = http.send(RequestDescriptor::get(url.clone())).await.unwrap();
        assert_eq!(value, json!({"id": "1"}));
    }
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    // The API must never be called without a token.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let http = client(&server);
    let err = http
        .send(RequestDescriptor::get(format!("{}/v1.0/me", server.uri())))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Auth { .. }), "{err:?}");

    let normalized = CommandError::from(err);
    assert_eq!(
        normalized.message,
        "Authentication failed: AADSTS7000215: Invalid client secret provided."
    );
}

#[tokio::test]
async fn unstructured_token_failure_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .send(RequestDescriptor::get(format!("{}/v1.0/me", server.uri())))
        .await
        .unwrap_err();
    let RequestError::Auth { message } = &err else {
        panic!("expected an auth error, got {err:?}");
    };
    assert_eq!(message, "token request failed (502 Bad Gateway): upstream unavailable");
}

#[tokio::test]
async fn invalid_url_is_rejected_before_sending() {
    let http = RestClient::new(TokenProvider::with_token("mock-token"));
    let err = http
        .send(RequestDescriptor::get("not a url"))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Raw(_)));
}
