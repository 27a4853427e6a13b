//! # Taskboard API
//!
//! 任务管理 REST API 服务模块，基于内存存储，提供任务的增删改查、过滤搜索、
//! 统计以及一个 HTML 文档页。
//!
//! ## API 端点
//!
//! - `GET /` - HTML 文档页（公开）
//! - `GET /api/tasks` - 获取任务列表，可选过滤参数 `completed`、`priority`、`q`
//! - `GET /api/tasks/stats` - 任务统计
//! - `POST /api/tasks` - 创建任务
//! - `GET /api/tasks/{id}` - 获取任务详情
//! - `PUT /api/tasks/{id}` - 部分更新任务
//! - `DELETE /api/tasks/{id}` - 删除任务
//!
//! 除文档页与不带过滤参数的任务列表外，所有路由都需要共享 API key，
//! 通过 `X-API-Key` 请求头或 `api-key` 查询参数提交。`OPTIONS` 预检请求
//! 一律返回 `204`。
//!
//! ## 中间件
//!
//! 由外到内：
//! - **追踪**: `tower-http` `TraceLayer`
//! - **日志记录**: 每个请求一行结果日志，4xx/5xx 使用 `ERROR` 级别
//! - **预检**: `OPTIONS` 直接返回 `204`
//! - **CORS**: 所有响应携带允许的来源、方法与请求头
//! - **panic 捕获**: 处理器 panic 转为 `500` 响应
//! - **认证**: API key 校验
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard_api::{create_app, routes::AppState, auth::ApiKeyGate};
//! use taskboard_domain::InMemoryTaskRepository;
//!
//! # async fn run() -> std::io::Result<()> {
//! let state = AppState::new(
//!     Arc::new(InMemoryTaskRepository::with_sample_tasks()),
//!     ApiKeyGate::new("my-secret-api-key-2025"),
//! );
//! let app = create_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### API 调用示例
//!
//! ```bash
//! # 创建任务
//! curl -X POST http://localhost:3000/api/tasks \
//!   -H "Content-Type: application/json" \
//!   -H "X-API-Key: my-secret-api-key-2025" \
//!   -d '{"title": "Buy milk", "priority": "high"}'
//!
//! # 获取未完成的任务
//! curl "http://localhost:3000/api/tasks?completed=false&api-key=my-secret-api-key-2025"
//! ```
//!
//! ## 响应格式
//!
//! 所有 JSON 响应均以两个空格缩进输出。错误响应形如：
//!
//! ```json
//! {
//!   "error": "Data validation error",
//!   "details": [
//!     { "field": "title", "message": "\"title\" is required" }
//!   ]
//! }
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use auth::{auth_middleware, preflight_middleware};
use middleware::{
    catch_panic_layer, cors_layer, cors_response_headers, request_logging, trace_layer,
};
use routes::{create_routes, AppState};
use taskboard_config::AppConfig;
use taskboard_domain::TaskRepository;

/// 创建完整的API应用
pub fn create_app(state: AppState) -> Router {
    let [allow_origin, allow_methods, allow_headers] = cors_response_headers();

    create_routes(state.clone()).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(axum::middleware::from_fn(preflight_middleware))
            .layer(allow_origin)
            .layer(allow_methods)
            .layer(allow_headers)
            .layer(cors_layer())
            // panic 生成的 500 也要经过 CORS 层
            .layer(catch_panic_layer())
            .layer(axum::middleware::from_fn_with_state(state, auth_middleware)),
    )
}

/// 根据应用配置创建API应用
pub fn create_app_with_config(task_repo: Arc<dyn TaskRepository>, config: &AppConfig) -> Router {
    create_app(AppState::from_config(task_repo, config))
}
