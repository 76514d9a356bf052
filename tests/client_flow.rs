//! Integration tests for the authenticated Graph client itself: bearer
//! header attachment, status handling, and error-body normalization at
//! the HTTP boundary.

use graphctl::auth::TokenProvider;
use graphctl::client::GraphClient;
use graphctl::error::CliError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_client(server: &MockServer) -> GraphClient {
    let tp = TokenProvider::with_token("mock-token");
    GraphClient::with_base_url(tp, &format!("{}/", server.uri()))
}

#[derive(Debug, serde::Deserialize)]
struct Probe {
    ok: bool,
}

#[tokio::test]
async fn requests_carry_the_bearer_token() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("v1.0/probe"))
        .and(header("authorization", "Bearer mock-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let probe: Probe = client.get("v1.0/probe").await.unwrap();
    assert!(probe.ok);
}

#[tokio::test]
async fn query_values_with_reserved_characters_arrive_intact() {
    // An OData expression carrying `&`, spaces, and quotes must survive
    // as a single query parameter instead of splitting the query string.
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("v1.0/probe"))
        .and(query_param("$filter", "displayName eq 'R&D'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let probe: Probe = client
        .get_with_query("v1.0/probe", &[("$filter", "displayName eq 'R&D'")])
        .await
        .unwrap();
    assert!(probe.ok);
}

#[tokio::test]
async fn delete_accepts_204_with_no_body() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("DELETE"))
        .and(path("v1.0/probe/x"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete("v1.0/probe/x").await.unwrap();
}

#[tokio::test]
async fn patch_no_content_discards_the_empty_body() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PATCH"))
        .and(path("v1.0/probe/x"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .patch_no_content("v1.0/probe/x", &serde_json::json!({"description": "d"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn non_success_with_unrecognized_body_is_stringified_as_is() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("v1.0/probe"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client.get::<Probe>("v1.0/probe").await.unwrap_err();
    match err {
        CliError::Api { status, message } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_success_with_empty_body_falls_back_to_the_status_line() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("v1.0/probe"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.get::<Probe>("v1.0/probe").await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn forbidden_is_not_retried() {
    // Only 401 triggers the token-refresh retry; a 403 must fail on the
    // first attempt.
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("v1.0/probe"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"message": "Insufficient privileges to complete the operation."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get::<Probe>("v1.0/probe").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Insufficient privileges to complete the operation."
    );
}
