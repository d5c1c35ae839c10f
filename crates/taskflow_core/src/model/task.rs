//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its status/priority vocabularies.
//! - Own the completion-timestamp lifecycle so every store applies it the same way.
//!
//! # Invariants
//! - `completed_at` is `Some` if and only if `status == TaskStatus::Completed`.
//! - Reassignment changes `assigned_to` only; status and deadline are untouched.
//! - `title` and `domain` are non-blank.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskId = i64;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task urgency label. Informational only; assignment ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Domain name reference.
    pub domain: String,
    pub assigned_to: Option<UserId>,
    /// Unix epoch milliseconds.
    pub deadline: i64,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_by: UserId,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl Task {
    /// Validates task invariants.
    ///
    /// # Errors
    /// - [`TaskValidationError::BlankTitle`] / [`TaskValidationError::BlankDomain`]
    ///   for empty text fields.
    /// - [`TaskValidationError::CompletionMismatch`] when `completed_at` and
    ///   `status` disagree.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.domain.trim().is_empty() {
            return Err(TaskValidationError::BlankDomain);
        }
        let completed = self.status == TaskStatus::Completed;
        if completed != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionMismatch {
                status: self.status,
                completed_at: self.completed_at,
            });
        }
        Ok(())
    }

    /// Moves the task to `status`, keeping `completed_at` consistent.
    ///
    /// Completing an already completed task keeps its original timestamp.
    pub fn apply_status(&mut self, status: TaskStatus, now_ms: i64) {
        self.completed_at = match status {
            TaskStatus::Completed => Some(self.completed_at.unwrap_or(now_ms)),
            TaskStatus::Pending => None,
        };
        self.status = status;
    }

    /// Pending and past its deadline at `now_ms`.
    pub fn is_overdue_at(&self, now_ms: i64) -> bool {
        self.status == TaskStatus::Pending && self.deadline < now_ms
    }
}

/// Insert payload for a new task. The store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub domain: String,
    pub assigned_to: Option<UserId>,
    pub deadline: i64,
    pub priority: Priority,
    pub created_by: UserId,
    pub created_at: i64,
}

impl NewTask {
    /// Materializes the record a store persists for this payload.
    ///
    /// New tasks always start `pending` without a completion timestamp.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            domain: self.domain,
            assigned_to: self.assigned_to,
            deadline: self.deadline,
            status: TaskStatus::Pending,
            priority: self.priority,
            created_by: self.created_by,
            created_at: self.created_at,
            completed_at: None,
        }
    }
}

/// Task invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    BlankDomain,
    CompletionMismatch {
        status: TaskStatus,
        completed_at: Option<i64>,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::BlankDomain => write!(f, "task domain must not be blank"),
            Self::CompletionMismatch {
                status,
                completed_at,
            } => write!(
                f,
                "task status `{}` is inconsistent with completed_at {:?}",
                status.as_str(),
                completed_at
            ),
        }
    }
}

impl Error for TaskValidationError {}
