use axum::{
    extract::State,
    http::{Method, Uri},
    response::Response,
};
use taskboard_domain::TaskStatistics;

use crate::{
    error::{ApiError, ApiResult},
    response::html,
    routes::AppState,
};

/// 路由未找到响应与文档页列出的路由
pub const AVAILABLE_ROUTES: [&str; 7] = [
    "GET /",
    "GET /api/tasks",
    "GET /api/tasks/stats",
    "POST /api/tasks",
    "GET /api/tasks/:id",
    "PUT /api/tasks/:id",
    "DELETE /api/tasks/:id",
];

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Task Board API</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 860px; margin: 40px auto; padding: 0 20px; line-height: 1.6; }
    code, pre { background: #f4f4f4; border-radius: 4px; }
    pre { padding: 10px; overflow-x: auto; }
    .endpoint { border-left: 4px solid #2b7cd3; padding: 4px 12px; margin: 12px 0; }
    .method { font-weight: bold; color: #2b7cd3; }
    .stats-box { border: 1px solid #ccc; padding: 15px; margin-top: 20px; border-radius: 5px; background: #e6f7ff; }
  </style>
</head>
<body>
  <h1>Task Board API</h1>
  <p>In-memory task management service.</p>

  <h2>Authentication</h2>
  <p>Every route except this page and the unfiltered task list requires the shared key,
  sent as the <code>X-API-Key</code> header or the <code>api-key</code> query parameter.</p>
"#;

const ENDPOINTS: &str = r#"
  <h2>Endpoints</h2>
  <div class="endpoint">
    <span class="method">GET</span> <code>/api/tasks</code>
    <p>List tasks. Optional filters: <code>completed</code>, <code>priority</code>, <code>q</code> (search in title or description). Filtering requires the key.</p>
  </div>
  <div class="endpoint">
    <span class="method">GET</span> <code>/api/tasks/stats</code>
    <p>Totals, pending count, tasks per priority and completions per day.</p>
  </div>
  <div class="endpoint">
    <span class="method">GET</span> <code>/api/tasks/:id</code>
    <p>Fetch a single task.</p>
  </div>
  <div class="endpoint">
    <span class="method">POST</span> <code>/api/tasks</code>
    <p>Create a task. <code>title</code> is required (3 to 100 characters), <code>description</code> up to 500 characters, <code>priority</code> one of high|medium|low.</p>
    <pre>{
  "title": "Buy milk",
  "description": "Two litres",
  "priority": "medium"
}</pre>
  </div>
  <div class="endpoint">
    <span class="method">PUT</span> <code>/api/tasks/:id</code>
    <p>Partial update; at least one of <code>title</code>, <code>description</code>, <code>completed</code>, <code>priority</code>. Completing a task records <code>completedAt</code>.</p>
  </div>
  <div class="endpoint">
    <span class="method">DELETE</span> <code>/api/tasks/:id</code>
    <p>Delete a task and return it.</p>
  </div>

  <h2>Examples</h2>
  <pre>curl -H "X-API-Key: $API_KEY" "http://localhost:3000/api/tasks/stats"</pre>
  <pre>curl -H "X-API-Key: $API_KEY" "http://localhost:3000/api/tasks?completed=false"</pre>
  <pre>curl -X POST -H "Content-Type: application/json" -H "X-API-Key: $API_KEY" -d '{"title":"Learn HTTP","description":"Study web protocols"}' http://localhost:3000/api/tasks</pre>
"#;

pub fn render_docs_page(stats: &TaskStatistics) -> String {
    format!(
        r#"{head}
  <div class="stats-box">
    <h3>Quick stats</h3>
    <p><strong>Total tasks:</strong> {total}</p>
    <p><strong>Pending:</strong> {pending}</p>
    <p><strong>By priority:</strong> high ({high}), medium ({medium}), low ({low})</p>
  </div>
{endpoints}
  <p><strong>Current state:</strong> {total} tasks stored</p>
</body>
</html>
"#,
        head = PAGE_HEAD,
        endpoints = ENDPOINTS,
        total = stats.total_tasks,
        pending = stats.pending,
        high = stats.by_priority.high,
        medium = stats.by_priority.medium,
        low = stats.by_priority.low,
    )
}

/// 根路径处理器 - 返回HTML文档页
pub async fn root_handler(State(state): State<AppState>) -> ApiResult<Response> {
    let tasks = state.task_repo.list().await?;
    let stats = TaskStatistics::from_tasks(&tasks);
    Ok(html(render_docs_page(&stats), "Web interface served"))
}

pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
