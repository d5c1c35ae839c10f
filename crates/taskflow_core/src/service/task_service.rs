//! Task use cases.
//!
//! # Responsibility
//! - Create tasks with least-loaded auto-assignment.
//! - Apply status changes under role rules.
//! - Serve role-scoped task listings.
//!
//! # Invariants
//! - Only leads create tasks.
//! - Members change status only on tasks assigned to them.
//! - Assignment is computed before the task is persisted; a domain with no
//!   members yields an unassigned task, never an error.

use crate::assignment::select_assignee;
use crate::model::task::{NewTask, Priority, Task, TaskId, TaskStatus};
use crate::model::user::{User, UserId};
use crate::repo::Store;
use crate::service::{optional_text, require_lead, required_text, ServiceError, ServiceResult};
use log::info;
use std::sync::Arc;

/// Task creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub domain: String,
    /// Unix epoch milliseconds.
    pub deadline: i64,
    pub priority: Priority,
}

/// Listing filter. Assignee wins over domain when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assigned_to: Option<UserId>,
    pub domain: Option<String>,
}

pub struct TaskService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> TaskService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a pending task and assigns it to the least-loaded domain member.
    ///
    /// # Errors
    /// - `Forbidden` unless `actor` is a lead.
    /// - `Validation` for blank title or domain.
    /// - `Repo` when assignment lookup or persistence fails.
    pub fn create(
        &self,
        actor: &User,
        request: &CreateTaskRequest,
        now_ms: i64,
    ) -> ServiceResult<Task> {
        require_lead(actor, "team lead access required")?;
        let title = required_text("title", &request.title)?;
        let domain = required_text("domain", &request.domain)?;

        let assigned_to = select_assignee(self.store.as_ref(), &domain)?;
        let task = self.store.create_task(&NewTask {
            title,
            description: optional_text(request.description.as_deref()),
            domain,
            assigned_to,
            deadline: request.deadline,
            priority: request.priority,
            created_by: actor.id,
            created_at: now_ms,
        })?;
        info!(
            "event=task_create module=task status=ok task_id={} assigned_to={:?}",
            task.id, task.assigned_to
        );
        Ok(task)
    }

    /// Changes task status, maintaining the completion timestamp.
    ///
    /// # Errors
    /// - `TaskNotFound` when the task does not exist (or vanished mid-request).
    /// - `Forbidden` when a member targets a task not assigned to them.
    pub fn update_status(
        &self,
        actor: &User,
        task_id: TaskId,
        status: TaskStatus,
        now_ms: i64,
    ) -> ServiceResult<Task> {
        let task = self
            .store
            .get_task(task_id)?
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        if !actor.is_lead() && task.assigned_to != Some(actor.id) {
            return Err(ServiceError::Forbidden("not authorized to update this task"));
        }

        let updated = self
            .store
            .update_task_status(task_id, status, now_ms)?
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        info!(
            "event=task_status module=task status=ok task_id={} task_status={}",
            updated.id,
            updated.status.as_str()
        );
        Ok(updated)
    }

    pub fn get(&self, task_id: TaskId) -> ServiceResult<Task> {
        self.store
            .get_task(task_id)?
            .ok_or(ServiceError::TaskNotFound(task_id))
    }

    /// Lists tasks newest first.
    ///
    /// Without a filter, leads see every task and members see their own.
    pub fn list(&self, actor: &User, filter: &TaskFilter) -> ServiceResult<Vec<Task>> {
        let domain = filter
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let tasks = match (filter.assigned_to, domain) {
            (Some(user_id), _) => self.store.tasks_by_user(user_id)?,
            (None, Some(domain)) => self.store.tasks_by_domain(domain)?,
            (None, None) => visible_tasks(self.store.as_ref(), actor)?,
        };
        Ok(tasks)
    }
}

/// Role-scoped task set: all tasks for leads, own tasks for members.
pub(crate) fn visible_tasks<S: Store + ?Sized>(store: &S, actor: &User) -> ServiceResult<Vec<Task>> {
    if actor.is_lead() {
        Ok(store.list_tasks()?)
    } else {
        Ok(store.tasks_by_user(actor.id)?)
    }
}
