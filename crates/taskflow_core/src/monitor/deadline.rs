//! Single-tick deadline sweep.

use crate::assignment::select_assignee;
use crate::model::now_epoch_ms;
use crate::model::task::{Task, TaskId};
use crate::model::user::UserId;
use crate::repo::{RepoResult, Store};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// One assignment change made by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reassignment {
    pub task_id: TaskId,
    pub from: Option<UserId>,
    pub to: UserId,
}

/// Outcome counters of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Overdue tasks found.
    pub scanned: usize,
    pub reassigned: Vec<Reassignment>,
    /// No candidate, or the candidate already holds the task.
    pub unchanged: usize,
    /// Task disappeared between query and update.
    pub skipped: usize,
    /// Storage failures or panics isolated to a single task.
    pub failed: usize,
}

enum TaskOutcome {
    Reassigned(Reassignment),
    Unchanged,
    Vanished,
}

/// Reassigns overdue pending tasks through least-loaded selection.
pub struct DeadlineMonitor<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> Clone for DeadlineMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store + ?Sized> DeadlineMonitor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Runs one sweep against the wall clock.
    pub fn tick(&self) -> RepoResult<TickReport> {
        self.tick_at(now_epoch_ms())
    }

    /// Runs one sweep treating `now_ms` as the current time.
    ///
    /// # Errors
    /// Only the overdue query itself can fail the tick. Per-task failures,
    /// panics included, are logged and counted in [`TickReport::failed`].
    pub fn tick_at(&self, now_ms: i64) -> RepoResult<TickReport> {
        let started_at = Instant::now();
        let overdue = self.store.overdue_tasks(now_ms)?;
        let mut report = TickReport {
            scanned: overdue.len(),
            ..TickReport::default()
        };

        for task in &overdue {
            match panic::catch_unwind(AssertUnwindSafe(|| self.reassign(task))) {
                Ok(Ok(TaskOutcome::Reassigned(change))) => report.reassigned.push(change),
                Ok(Ok(TaskOutcome::Unchanged)) => report.unchanged += 1,
                Ok(Ok(TaskOutcome::Vanished)) => report.skipped += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!(
                        "event=task_reassign_failed module=monitor status=error task_id={} domain={} error={}",
                        task.id, task.domain, err
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    error!(
                        "event=task_reassign_failed module=monitor status=panic task_id={} domain={}",
                        task.id, task.domain
                    );
                }
            }
        }

        info!(
            "event=monitor_tick module=monitor status=ok scanned={} reassigned={} unchanged={} skipped={} failed={} duration_ms={}",
            report.scanned,
            report.reassigned.len(),
            report.unchanged,
            report.skipped,
            report.failed,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn reassign(&self, task: &Task) -> RepoResult<TaskOutcome> {
        let Some(candidate) = select_assignee(self.store.as_ref(), &task.domain)? else {
            return Ok(TaskOutcome::Unchanged);
        };
        if task.assigned_to == Some(candidate) {
            return Ok(TaskOutcome::Unchanged);
        }

        match self.store.update_task_assignment(task.id, candidate)? {
            Some(_) => {
                info!(
                    "event=task_reassigned module=monitor status=ok task_id={} from={:?} to={}",
                    task.id, task.assigned_to, candidate
                );
                Ok(TaskOutcome::Reassigned(Reassignment {
                    task_id: task.id,
                    from: task.assigned_to,
                    to: candidate,
                }))
            }
            None => {
                debug!(
                    "event=task_reassigned module=monitor status=skipped task_id={} reason=not_found",
                    task.id
                );
                Ok(TaskOutcome::Vanished)
            }
        }
    }
}
