use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

/// 附加在响应上的日志行，由 `request_logging` 读取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
}

impl Outcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 两空格缩进的 JSON 响应体
#[derive(Debug, Clone)]
pub struct PrettyJson<T>(pub T);

impl<T> IntoResponse for PrettyJson<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                body,
            )
                .into_response(),
            Err(err) => {
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )],
                    r#"{"error": "Internal server error"}"#,
                )
                    .into_response();
                response
                    .extensions_mut()
                    .insert(Outcome::new(format!("Response serialization failed: {err}")));
                response
            }
        }
    }
}

/// 响应尚未携带结果消息时附加
pub fn with_outcome(mut response: Response, message: impl Into<String>) -> Response {
    if response.extensions().get::<Outcome>().is_none() {
        response.extensions_mut().insert(Outcome::new(message));
    }
    response
}

pub fn json<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> Response {
    with_outcome((status, PrettyJson(data)).into_response(), message)
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    json(StatusCode::OK, data, message)
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    json(StatusCode::CREATED, data, message)
}

pub fn html(body: String, message: impl Into<String>) -> Response {
    with_outcome(Html(body).into_response(), message)
}

pub fn no_content(message: impl Into<String>) -> Response {
    with_outcome(StatusCode::NO_CONTENT.into_response(), message)
}
