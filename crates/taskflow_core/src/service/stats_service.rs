//! Dashboard counters.

use crate::model::task::TaskStatus;
use crate::model::user::User;
use crate::repo::Store;
use crate::service::task_service::visible_tasks;
use crate::service::ServiceResult;
use serde::Serialize;
use std::sync::Arc;

/// Counters over the actor's visible tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed: usize,
    /// Pending and not yet due.
    pub in_progress: usize,
    /// Pending and past deadline.
    pub overdue: usize,
}

pub struct StatsService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> StatsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn stats(&self, actor: &User, now_ms: i64) -> ServiceResult<TaskStats> {
        let tasks = visible_tasks(self.store.as_ref(), actor)?;
        let mut stats = TaskStats {
            total_tasks: tasks.len(),
            ..TaskStats::default()
        };
        for task in &tasks {
            match task.status {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending if task.is_overdue_at(now_ms) => stats.overdue += 1,
                TaskStatus::Pending => stats.in_progress += 1,
            }
        }
        Ok(stats)
    }
}
