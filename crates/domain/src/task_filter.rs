use crate::models::Task;

/// 列表过滤条件，所有已设置的条件都需满足（逻辑与）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// 与小写优先级名逐字比较
    pub priority: Option<String>,
    /// 标题或描述中不区分大小写的子串
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.priority.is_none() && self.search.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }

        if let Some(priority) = &self.priority {
            if task.priority.as_str() != priority {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !task.title.to_lowercase().contains(&term)
                && !task.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        true
    }
}
