use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskBoardError {
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

impl TaskBoardError {
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}
