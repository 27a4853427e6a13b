//! Taskboard 领域层
//!
//! 任务模型、任务仓储抽象与内存实现，以及统计计算。

pub mod models;
pub mod repositories;
pub mod services;
pub mod store;
pub mod task_filter;

pub use models::*;
pub use repositories::*;
pub use services::*;
pub use store::InMemoryTaskRepository;
pub use task_filter::TaskFilter;
pub use taskboard_errors::{TaskBoardError, TaskBoardResult};
