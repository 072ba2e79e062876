#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use marketai_api::{ApiConfig, AppState, AppStateInner};
use marketai_db::Database;

pub const TEST_SECRET: &str = "test-secret";

/// Settings with a short simulated upload delay so tests stay fast.
pub fn test_config(edit_api_url: &str) -> ApiConfig {
    ApiConfig {
        jwt_secret: TEST_SECRET.to_string(),
        edit_api_url: edit_api_url.to_string(),
        edit_timeout: Duration::from_secs(5),
        upload_delay: Duration::from_millis(10),
    }
}

/// Build the full router over a fresh in-memory store.
pub fn build_test_app() -> (Router, AppState) {
    build_test_app_with_edit_url("http://127.0.0.1:9")
}

pub fn build_test_app_with_edit_url(edit_api_url: &str) -> (Router, AppState) {
    let state = AppStateInner::new(Database::in_memory(), test_config(edit_api_url))
        .expect("state should build");
    (marketai_api::router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Register a fresh account and return its access token.
pub async fn register(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({ "email": email, "password": "hunter22", "name": "Test User" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["accessToken"]
        .as_str()
        .expect("accessToken should be a string")
        .to_string()
}

/// Save a post and return its id.
pub async fn save_post(app: &Router, token: &str, platform: &str) -> String {
    let response = post_json(
        app,
        "/api/catalog/save",
        serde_json::json!({
            "platform": platform,
            "caption": format!("Hello {platform}"),
            "hashtags": ["#Sale", "#NewPost"],
            "imageUrl": "https://example.com/post.png",
        }),
        Some(token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["postId"]
        .as_str()
        .expect("postId should be a string")
        .to_string()
}
