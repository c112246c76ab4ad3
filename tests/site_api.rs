use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use convoflow_backend::api::dialer::{DialerClient, DialerConfig};
use convoflow_backend::{app, AppState};

fn test_app(dialer_server: &MockServer) -> axum::Router {
    let dialer = DialerClient::new(DialerConfig {
        base_url: dialer_server.base_url(),
        api_key: "test-key".to_string(),
    });
    app(Arc::new(AppState::new(dialer, None)))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_with_cookie(uri: &str, body: Value, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let server = MockServer::start();
    let app = test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn industries_lists_the_dropdown_options() {
    let server = MockServer::start();
    let app = test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/industries")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["industries"]
        .as_array()
        .unwrap()
        .contains(&json!("Real Estate")));
}

#[tokio::test]
async fn demo_call_places_the_call_and_sets_the_cooldown_cookie() {
    let server = MockServer::start();
    let dialer_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/demo-call")
            .json_body_partial(r#"{"phoneNumber": "+971551234567"}"#);
        then.status(200).json_body(json!({"queued": true}));
    });
    let app = test_app(&server);

    let response = app
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "055 123 4567", "industry": "real-estate"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("cooldown cookie must be set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("lastDemoCall="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=86400"));

    let body = body_json(response).await;
    assert_eq!(body, json!({"success": true}));
    dialer_mock.assert();
}

#[tokio::test]
async fn invalid_phone_never_reaches_the_dialer() {
    let server = MockServer::start();
    let dialer_mock = server.mock(|when, then| {
        when.method(POST).path("/demo-call");
        then.status(200);
    });
    let app = test_app(&server);

    let response = app
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "9715551234"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please enter a valid UAE phone number");
    dialer_mock.assert_hits(0);
}

#[tokio::test]
async fn replayed_cookie_is_throttled_for_an_hour() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/demo-call");
        then.status(200);
    });
    let app = test_app(&server);

    let first = app
        .clone()
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "0501234567"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let set_cookie = first
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let second = app
        .oneshot(json_request_with_cookie(
            "/api/demo-call",
            json!({"phoneNumber": "0501234567"}),
            &cookie_pair,
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(second).await;
    assert_eq!(body["error"], "You can only request one demo call per hour");
}

#[tokio::test]
async fn cleared_cookie_still_hits_the_per_number_backstop() {
    let server = MockServer::start();
    let dialer_mock = server.mock(|when, then| {
        when.method(POST).path("/demo-call");
        then.status(200);
    });
    let app = test_app(&server);

    // Same subscriber in two formats, cookie dropped between requests.
    let first = app
        .clone()
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "0521234567"}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "+971521234567"}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(second).await;
    assert_eq!(body["error"], "You can only request one demo call per hour");
    dialer_mock.assert_hits(1);
}

#[tokio::test]
async fn malformed_cookie_fails_open() {
    let server = MockServer::start();
    let dialer_mock = server.mock(|when, then| {
        when.method(POST).path("/demo-call");
        then.status(200);
    });
    let app = test_app(&server);

    let response = app
        .oneshot(json_request_with_cookie(
            "/api/demo-call",
            json!({"phoneNumber": "0531234567"}),
            "lastDemoCall=garbage-not-a-timestamp",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    dialer_mock.assert_hits(1);
}

#[tokio::test]
async fn dialer_outage_surfaces_as_temporarily_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/demo-call");
        then.status(500).body("upstream exploded");
    });
    let app = test_app(&server);

    let response = app
        .oneshot(json_request(
            "/api/demo-call",
            json!({"phoneNumber": "0541234567"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    // No cooldown cookie on a failed call: the visitor may retry.
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Service temporarily unavailable. Please try again later."
    );
}

#[tokio::test]
async fn contact_submission_succeeds() {
    let server = MockServer::start();
    let app = test_app(&server);

    let response = app
        .oneshot(json_request(
            "/api/contact",
            json!({
                "firstName": "Aisha",
                "lastName": "Khan",
                "email": "aisha@example.com",
                "phone": "0501234567",
                "company": "Gulf Estates",
                "industry": "Real Estate",
                "message": "Interested in the outbound agent."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thank you! We'll be in touch with you shortly.");
}

#[tokio::test]
async fn contact_validation_errors_are_per_field() {
    let server = MockServer::start();
    let app = test_app(&server);

    let response = app
        .oneshot(json_request(
            "/api/contact",
            json!({
                "firstName": "",
                "lastName": "Khan",
                "email": "not-an-email",
                "phone": "0501234567",
                "company": "Gulf Estates",
                "industry": "Real Estate"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"]["firstName"], "First name is required");
    assert_eq!(body["errors"]["email"], "Please enter a valid email address");
}

#[tokio::test]
async fn contact_is_rate_limited_per_email() {
    let server = MockServer::start();
    let app = test_app(&server);

    let payload = json!({
        "firstName": "Aisha",
        "lastName": "Khan",
        "email": "repeat@example.com",
        "phone": "0501234567",
        "company": "Gulf Estates",
        "industry": "Healthcare"
    });

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request("/api/contact", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let fourth = app
        .oneshot(json_request("/api/contact", payload))
        .await
        .unwrap();
    assert_eq!(fourth.status(), StatusCode::TOO_MANY_REQUESTS);
}
