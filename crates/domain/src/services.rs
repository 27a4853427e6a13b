//! 任务统计

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Priority, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }
}

/// 按需从全部任务计算的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total_tasks: usize,
    pub pending: usize,
    pub by_priority: PriorityCounts,
    /// `YYYY-MM-DD`（UTC）到当天完成任务数
    pub completed_by_day: BTreeMap<String, usize>,
}

impl TaskStatistics {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = TaskStatistics {
            total_tasks: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            stats.by_priority.bump(task.priority);

            if !task.completed {
                stats.pending += 1;
            }

            if let (true, Some(completed_at)) = (task.completed, task.completed_at) {
                let day = completed_at.format("%Y-%m-%d").to_string();
                *stats.completed_by_day.entry(day).or_insert(0) += 1;
            }
        }

        stats
    }
}
