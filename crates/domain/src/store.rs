//! 内存任务仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{NewTask, Priority, Task, TaskPatch};
use crate::repositories::TaskRepository;
use crate::task_filter::TaskFilter;
use taskboard_errors::{TaskBoardError, TaskBoardResult};

/// 任务与 id 计数器放在同一把锁下，分配 id 与插入是原子的
#[derive(Debug)]
struct TaskTable {
    tasks: Vec<Task>,
    next_id: i64,
}

#[derive(Debug)]
pub struct InMemoryTaskRepository {
    table: Mutex<TaskTable>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// 以 `tasks` 为初始数据，新 id 从现有最大值之后继续
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            table: Mutex::new(TaskTable { tasks, next_id }),
        }
    }

    pub fn with_sample_tasks() -> Self {
        Self::with_tasks(sample_tasks())
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_time(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// 服务启动时的两个示例任务
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            title: "Learn Rust".to_string(),
            description: "Finish the basic tutorials".to_string(),
            completed: false,
            priority: Priority::High,
            created_at: seed_time("2025-11-01T10:00:00Z"),
            completed_at: None,
        },
        Task {
            id: 2,
            title: "Practice HTTP".to_string(),
            description: "Build a basic server".to_string(),
            completed: true,
            priority: Priority::Medium,
            created_at: seed_time("2025-11-05T12:00:00Z"),
            completed_at: Some(seed_time("2025-12-04T15:30:00Z")),
        },
    ]
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self) -> TaskBoardResult<Vec<Task>> {
        Ok(self.table.lock().await.tasks.clone())
    }

    async fn search(&self, filter: &TaskFilter) -> TaskBoardResult<Vec<Task>> {
        let table = self.table.lock().await;
        Ok(table
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> TaskBoardResult<Task> {
        let table = self.table.lock().await;
        table
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| TaskBoardError::task_not_found(id))
    }

    async fn create(&self, new_task: NewTask) -> TaskBoardResult<Task> {
        let mut table = self.table.lock().await;
        let id = table.next_id;
        table.next_id += 1;

        let task = Task::new(id, new_task, Utc::now());
        table.tasks.push(task.clone());
        debug!(task_id = id, "task stored");
        Ok(task)
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> TaskBoardResult<Task> {
        let mut table = self.table.lock().await;
        let task = table
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskBoardError::task_not_found(id))?;

        task.apply(patch, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> TaskBoardResult<Task> {
        let mut table = self.table.lock().await;
        let index = table
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| TaskBoardError::task_not_found(id))?;

        Ok(table.tasks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sample_store_continues_ids_after_seed() {
        let repo = InMemoryTaskRepository::with_sample_tasks();
        assert_eq!(repo.list().await.unwrap().len(), 2);

        let created = repo.create(NewTask::new("Buy milk")).await.unwrap();
        assert_eq!(created.id, 3);
        assert!(!created.completed);
        assert!(created.completed_at.is_none());
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.description, "");
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let repo = InMemoryTaskRepository::new();
        let first = repo.create(NewTask::new("first")).await.unwrap();
        assert_eq!(first.id, 1);

        repo.delete(first.id).await.unwrap();
        let second = repo.create(NewTask::new("second")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let repo = InMemoryTaskRepository::with_sample_tasks();
        let err = repo.get(99).await.unwrap_err();
        assert!(matches!(err, TaskBoardError::TaskNotFound { id: 99 }));
    }

    #[tokio::test]
    async fn test_update_merges_and_follows_completion_rule() {
        let repo = InMemoryTaskRepository::with_sample_tasks();

        let updated = repo
            .update(
                1,
                TaskPatch {
                    completed: Some(true),
                    title: Some("Learn more Rust".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert!(updated.completed_at.is_some());
        assert_eq!(updated.title, "Learn more Rust");
        assert_eq!(updated.description, "Finish the basic tutorials");

        let reopened = repo
            .update(
                1,
                TaskPatch {
                    completed: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!reopened.completed);
        assert!(reopened.completed_at.is_none());
        assert_eq!(repo.get(1).await.unwrap(), reopened);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let repo = InMemoryTaskRepository::new();
        let result = repo.update(5, TaskPatch::default()).await;
        assert!(matches!(result, Err(TaskBoardError::TaskNotFound { id: 5 })));
    }

    #[tokio::test]
    async fn test_delete_missing_task_leaves_collection_untouched() {
        let repo = InMemoryTaskRepository::with_sample_tasks();
        let before = repo.list().await.unwrap();

        assert!(repo.delete(42).await.is_err());
        assert_eq!(repo.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_task() {
        let repo = InMemoryTaskRepository::with_sample_tasks();
        let removed = repo.delete(2).await.unwrap();
        assert_eq!(removed.title, "Practice HTTP");
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(repo.get(2).await.is_err());
    }

    #[tokio::test]
    async fn test_search_delegates_to_filter() {
        let repo = InMemoryTaskRepository::with_sample_tasks();
        let filter = TaskFilter {
            completed: Some(true),
            ..Default::default()
        };
        let found = repo.search(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let repo = Arc::new(InMemoryTaskRepository::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(NewTask::new(format!("task {i}"))).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
    }
}
