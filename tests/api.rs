use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use circlehub::{build_app, AppState};

fn app() -> axum::Router {
    build_app(AppState::fake())
}

/// Send a request to the app and return (status, parsed JSON body).
async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn health_is_reachable_without_a_token() {
    let response = app().oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn routes_outside_the_api_prefix_do_not_exist() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_route_without_token_returns_enveloped_401() {
    let (status, json) = send(get("/api/v1/circle/byUser")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"]["id"], 401);
    let errors = json["status"]["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
    // failures never carry a data key, not even a null one
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let request = Request::builder()
        .uri("/api/v1/plugin/getPlugins")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"]["id"], 401);
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn register_collects_every_validation_problem() {
    let body = r#"{
        "email": "not-an-email",
        "password": "short",
        "firstName": "  ",
        "lastName": "Doe"
    }"#;
    let (status, json) = send(post_json("/api/v1/user/register", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"]["id"], 422);
    let errors: Vec<String> = json["status"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap().to_owned())
        .collect();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e.contains("email")));
    assert!(errors.iter().any(|e| e.contains("password")));
    assert!(errors.iter().any(|e| e.contains("first name")));
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn refresh_with_invalid_token_returns_401() {
    let body = r#"{"refreshToken": "definitely-not-valid"}"#;
    let (status, json) = send(post_json("/api/v1/user/refresh", body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"]["errors"][0], "invalid refresh token");
}

#[tokio::test]
async fn tracking_record_requires_a_token_before_validation() {
    // even a nonsense position is rejected by auth first
    let body = r#"{"circleId": 1, "latitude": 999.0, "longitude": 0.0}"#;
    let (status, json) = send(post_json("/api/v1/tracking/record", body)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"]["id"], 401);
}
