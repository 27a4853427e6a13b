//! 领域仓储抽象

use async_trait::async_trait;

use crate::models::{NewTask, Task, TaskPatch};
use crate::task_filter::TaskFilter;
use taskboard_errors::TaskBoardResult;

/// 任务仓储抽象
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self) -> TaskBoardResult<Vec<Task>>;
    async fn search(&self, filter: &TaskFilter) -> TaskBoardResult<Vec<Task>>;
    async fn get(&self, id: i64) -> TaskBoardResult<Task>;
    async fn create(&self, new_task: NewTask) -> TaskBoardResult<Task>;
    async fn update(&self, id: i64, patch: TaskPatch) -> TaskBoardResult<Task>;
    async fn delete(&self, id: i64) -> TaskBoardResult<Task>;
}
