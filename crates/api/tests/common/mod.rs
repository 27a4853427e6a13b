#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use taskboard_api::{auth::ApiKeyGate, create_app, routes::AppState};
use taskboard_domain::InMemoryTaskRepository;

pub const TEST_API_KEY: &str = "test-api-key";

/// 预置两个示例任务、由 [`TEST_API_KEY`] 保护的应用
pub fn test_app() -> Router {
    create_app(test_state())
}

pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryTaskRepository::with_sample_tasks()),
        ApiKeyGate::new(TEST_API_KEY),
    )
}

pub fn request(method: Method, uri: &str, body: Option<&Value>, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn raw_request(method: Method, uri: &str, raw: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(raw.to_string())).unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let text = body_text(response).await;
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap()
}

/// 发送请求，返回状态码与解析后的 JSON 响应体
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&Value>,
    api_key: Option<&str>,
) -> (StatusCode, Value) {
    let response = call(app, request(method, uri, body, api_key)).await;
    let status = response.status();
    (status, body_json(response).await)
}

pub fn task_ids(body: &Value) -> Vec<i64> {
    body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_i64().unwrap())
        .collect()
}
