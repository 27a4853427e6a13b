use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError(pub String);

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority '{}'", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// 已校验的新建任务字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// 部分更新：`None` 表示该字段保持不变
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    /// 本次更新涉及的字段名（线上格式）
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.completed.is_some() {
            fields.push("completed");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        fields
    }
}

impl Task {
    pub fn new(id: i64, new_task: NewTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_task.title,
            description: new_task.description,
            completed: false,
            priority: new_task.priority,
            created_at,
            completed_at: None,
        }
    }

    /// 将 `patch` 合并到任务
    ///
    /// 仅在未完成变为已完成时以 `now` 写入 `completed_at`，
    /// `completed` 置为 false 时清空
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(completed) = patch.completed {
            if completed && !self.completed {
                self.completed_at = Some(now);
            } else if !completed {
                self.completed_at = None;
            }
            self.completed = completed;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, hour, 0, 0).unwrap()
    }

    fn pending_task() -> Task {
        Task::new(
            1,
            NewTask::new("Write report").with_description("quarterly numbers"),
            ts(1, 10),
        )
    }

    #[test]
    fn test_new_task_defaults() {
        let task = pending_task();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, ts(1, 10));
    }

    #[test]
    fn test_completing_sets_timestamp() {
        let mut task = pending_task();
        task.apply(
            TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
            ts(2, 9),
        );
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(ts(2, 9)));
    }

    #[test]
    fn test_completing_twice_keeps_first_timestamp() {
        let mut task = pending_task();
        let complete = TaskPatch {
            completed: Some(true),
            ..Default::default()
        };
        task.apply(complete.clone(), ts(2, 9));
        task.apply(complete, ts(3, 9));
        assert_eq!(task.completed_at, Some(ts(2, 9)));
    }

    #[test]
    fn test_reopening_clears_timestamp() {
        let mut task = pending_task();
        task.apply(
            TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
            ts(2, 9),
        );
        task.apply(
            TaskPatch {
                completed: Some(false),
                ..Default::default()
            },
            ts(3, 9),
        );
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let mut task = pending_task();
        task.apply(
            TaskPatch {
                priority: Some(Priority::Low),
                ..Default::default()
            },
            ts(2, 9),
        );
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "quarterly numbers");
        assert!(!task.completed);
        assert_eq!(task.created_at, ts(1, 10));
    }

    #[test]
    fn test_patch_field_names() {
        let patch = TaskPatch {
            title: Some("x".into()),
            completed: Some(true),
            ..Default::default()
        };
        assert_eq!(patch.field_names(), vec!["title", "completed"]);
        assert!(TaskPatch::default().field_names().is_empty());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
        assert!("HIGH".parse::<Priority>().is_err());
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let task = pending_task();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["createdAt"], "2025-11-01T10:00:00Z");
        assert!(json["completedAt"].is_null());
        assert!(json.get("created_at").is_none());
    }
}
