use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Method, Uri},
    response::Response,
};
use serde::Serialize;
use serde_json::Value;
use taskboard_domain::{Task, TaskFilter, TaskStatistics};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success},
    routes::AppState,
    validation::{parse_json_body, validate_create_task, validate_update_task},
};

pub const COMPLETED_PARAM: &str = "completed";
pub const PRIORITY_PARAM: &str = "priority";
pub const SEARCH_PARAM: &str = "q";

/// 任务列表响应
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub total: usize,
    pub tasks: Vec<Task>,
}

/// 任务删除响应
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub message: String,
    pub task: Task,
}

/// 空值视为未提供
pub fn filter_from_query(query: &HashMap<String, String>) -> TaskFilter {
    let value = |key: &str| query.get(key).map(String::as_str).filter(|v| !v.is_empty());

    TaskFilter {
        completed: value(COMPLETED_PARAM).map(|v| v == "true"),
        priority: value(PRIORITY_PARAM).map(str::to_string),
        search: value(SEARCH_PARAM).map(str::to_string),
    }
}

fn describe_filter(filter: &TaskFilter) -> String {
    let mut parts = Vec::new();
    if let Some(completed) = filter.completed {
        parts.push(format!("{COMPLETED_PARAM}={completed}"));
    }
    if let Some(priority) = &filter.priority {
        parts.push(format!("{PRIORITY_PARAM}={priority}"));
    }
    if let Some(search) = &filter.search {
        parts.push(format!("{SEARCH_PARAM}={search}"));
    }

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

/// 非整数 id 不匹配任务路由
fn parse_task_id(method: &Method, uri: &Uri, raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    })
}

async fn read_json_body(body: Body, limit: usize) -> ApiResult<Value> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ApiError::BodyRead(e.to_string()))?;
    debug!(bytes = bytes.len(), "请求体读取完成");
    parse_json_body(&bytes)
}

/// 获取任务列表
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let filter = filter_from_query(&query);
    let tasks = if filter.is_empty() {
        state.task_repo.list().await?
    } else {
        state.task_repo.search(&filter).await?
    };

    let message = format!(
        "Listing {} tasks (filters: {})",
        tasks.len(),
        describe_filter(&filter)
    );
    Ok(success(
        TaskListResponse {
            total: tasks.len(),
            tasks,
        },
        message,
    ))
}

/// 获取任务统计
pub async fn task_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let tasks = state.task_repo.list().await?;
    Ok(success(
        TaskStatistics::from_tasks(&tasks),
        "Statistics generated",
    ))
}

/// 获取单个任务
pub async fn get_task(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_task_id(&method, &uri, &raw_id)?;
    let task = state.task_repo.get(id).await?;
    Ok(success(task, format!("Task with ID {id} retrieved")))
}

/// 创建任务
pub async fn create_task(State(state): State<AppState>, body: Body) -> ApiResult<Response> {
    let value = read_json_body(body, state.max_body_bytes).await?;
    let new_task = validate_create_task(&value)?;

    let task = state.task_repo.create(new_task).await?;
    let message = format!("Task created with ID {}", task.id);
    Ok(created(task, message))
}

/// 更新任务
pub async fn update_task(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Path(raw_id): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    let id = parse_task_id(&method, &uri, &raw_id)?;
    let value = read_json_body(body, state.max_body_bytes).await?;
    let patch = validate_update_task(&value)?;

    let fields = patch.field_names().join(", ");
    let task = state.task_repo.update(id, patch).await?;
    Ok(success(
        task,
        format!("Task with ID {id} updated. Fields: {fields}"),
    ))
}

/// 删除任务
pub async fn delete_task(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_task_id(&method, &uri, &raw_id)?;
    let task = state.task_repo.delete(id).await?;
    Ok(success(
        DeleteTaskResponse {
            message: "Task deleted".to_string(),
            task,
        },
        format!("Task with ID {id} deleted"),
    ))
}
