use axum::{
    routing::{get, MethodRouter},
    Router,
};
use std::sync::Arc;

use taskboard_config::AppConfig;
use taskboard_domain::TaskRepository;

use crate::auth::ApiKeyGate;
use crate::handlers::{
    root::{root_handler, route_not_found},
    tasks::{create_task, delete_task, get_task, list_tasks, task_stats, update_task},
};

pub const ROOT_PATH: &str = "/";
pub const TASKS_PATH: &str = "/api/tasks";
pub const TASK_STATS_PATH: &str = "/api/tasks/stats";
pub const TASK_PATH: &str = "/api/tasks/{id}";

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub task_repo: Arc<dyn TaskRepository>,
    pub api_key_gate: Arc<ApiKeyGate>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(task_repo: Arc<dyn TaskRepository>, api_key_gate: ApiKeyGate) -> Self {
        Self {
            task_repo,
            api_key_gate: Arc::new(api_key_gate),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn from_config(task_repo: Arc<dyn TaskRepository>, config: &AppConfig) -> Self {
        Self::new(task_repo, ApiKeyGate::from_config(&config.auth))
            .with_max_body_bytes(config.server.max_body_bytes)
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// 未注册的方法落到 404 路由错误，而不是 405
fn not_found_fallback(router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.fallback(route_not_found)
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route(ROOT_PATH, not_found_fallback(get(root_handler)))
        // 静态路径需在 `{id}` 之前可辨
        .route(TASK_STATS_PATH, not_found_fallback(get(task_stats)))
        .route(
            TASKS_PATH,
            not_found_fallback(get(list_tasks).post(create_task)),
        )
        .route(
            TASK_PATH,
            not_found_fallback(get(get_task).put(update_task).delete(delete_task)),
        )
        .fallback(route_not_found)
        .with_state(state)
}
