use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use taskboard_errors::TaskBoardError;

use crate::auth::AuthError;
use crate::handlers::root::AVAILABLE_ROUTES;
use crate::response::json;
use crate::validation::field_errors;

pub const MALFORMED_BODY_MESSAGE: &str = "Invalid request body format (JSON)";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. A valid 'X-API-Key' is required.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("请求体不是合法的JSON")]
    MalformedBody,

    #[error("读取请求体失败: {0}")]
    BodyRead(String),

    #[error("数据验证失败: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("认证错误: {0}")]
    Authentication(#[from] AuthError),

    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },

    #[error("路由不存在: {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl From<TaskBoardError> for ApiError {
    fn from(err: TaskBoardError) -> Self {
        match err {
            TaskBoardError::TaskNotFound { id } => ApiError::TaskNotFound { id },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody | ApiError::BodyRead(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::TaskNotFound { .. } | ApiError::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (body, log_message) = match &self {
            ApiError::MalformedBody => (
                json!({ "error": MALFORMED_BODY_MESSAGE }),
                MALFORMED_BODY_MESSAGE.to_string(),
            ),
            ApiError::BodyRead(detail) => (
                json!({
                    "error": "Error reading the request body",
                    "detail": detail,
                }),
                format!("Error reading the request body: {detail}"),
            ),
            ApiError::Validation(errors) => {
                let details = field_errors(errors);
                let mut fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                fields.dedup();
                let log_message = format!("Validation failed: {}", fields.join(", "));
                (
                    json!({
                        "error": "Data validation error",
                        "details": details,
                    }),
                    log_message,
                )
            }
            ApiError::Authentication(err) => (
                json!({ "error": UNAUTHORIZED_MESSAGE }),
                format!("Unauthorized access ({err})"),
            ),
            ApiError::TaskNotFound { id } => (
                json!({ "error": "Task not found" }),
                format!("Task with ID {id} not found"),
            ),
            ApiError::RouteNotFound { method, path } => (
                json!({
                    "error": "Route not found",
                    "method": method,
                    "path": path,
                    "available": AVAILABLE_ROUTES,
                }),
                "Route not found".to_string(),
            ),
            ApiError::Internal(detail) => (
                json!({
                    "error": "Internal server error",
                    "detail": detail,
                }),
                format!("Internal server error: {detail}"),
            ),
        };

        json(status, body, log_message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
