use std::any::Any;

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any as AnyOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::auth::{ALLOWED_HEADERS, ALLOWED_METHODS, API_KEY_HEADER};
use crate::error::ApiError;
use crate::response::Outcome;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// 按响应状态记录一行日志，消息取自处理器附带的 [`Outcome`]
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let message = response
        .extensions()
        .get::<Outcome>()
        .map(|outcome| outcome.message.as_str())
        .unwrap_or("");
    let duration = start.elapsed();

    if status.is_client_error() || status.is_server_error() {
        error!(
            status = status.as_u16(),
            elapsed = ?duration,
            "{} {} -> {} - {}",
            method,
            path,
            status.as_u16(),
            message
        );
    } else {
        info!(
            status = status.as_u16(),
            elapsed = ?duration,
            "{} {} -> {} - {}",
            method,
            path,
            status.as_u16(),
            message
        );
    }

    response
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
        ])
}

/// `CorsLayer` 只在预检响应上写入允许的方法与请求头，这里补齐到所有响应
pub fn cors_response_headers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    [
        SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ),
        SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ),
    ]
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "请求处理过程中发生panic");
    ApiError::Internal(detail).into_response()
}
