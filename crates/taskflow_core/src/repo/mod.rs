//! Storage contracts and adapters.
//!
//! # Responsibility
//! - Define use-case oriented data access traits for users, domains and tasks.
//! - Provide the SQLite adapter and the in-process adapter behind one [`Store`]
//!   capability so assignment and monitoring never see which one is active.
//!
//! # Invariants
//! - Every adapter enforces `Task::validate()` on write and on read.
//! - `users_by_domain` and `list_users` return users in ascending id order;
//!   assignment tie-breaking depends on it.
//! - Each call is atomic from the caller's perspective.
//! - Update operations report a missing record as `Ok(None)`, not as an error.

use crate::db::DbError;
use crate::model::domain::{Domain, NewDomain};
use crate::model::task::{NewTask, Task, TaskId, TaskStatus, TaskValidationError};
use crate::model::user::{NewUser, User, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error shared by all adapters.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    /// Unique key already taken (user email, domain name).
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// User persistence.
pub trait UserRepository {
    /// Inserts a user; `Conflict` when the email is taken.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Exact match on the normalized email.
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn update_user_domain(&self, id: UserId, domain: &str) -> RepoResult<Option<User>>;
    /// Users preferring `domain`, ascending id.
    fn users_by_domain(&self, domain: &str) -> RepoResult<Vec<User>>;
    /// All users, ascending id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

/// Domain persistence.
pub trait DomainRepository {
    /// Inserts a domain; `Conflict` when the name is taken.
    fn create_domain(&self, domain: &NewDomain) -> RepoResult<Domain>;
    fn get_domain_by_name(&self, name: &str) -> RepoResult<Option<Domain>>;
    /// All domains, ascending id.
    fn list_domains(&self) -> RepoResult<Vec<Domain>>;
}

/// Task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// All tasks, newest first.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Tasks assigned to `user_id`, newest first.
    fn tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<Task>>;
    /// Tasks tagged with `domain` in any status, newest first.
    fn tasks_by_domain(&self, domain: &str) -> RepoResult<Vec<Task>>;
    /// Pending tasks with `deadline < now_ms`, earliest deadline first.
    fn overdue_tasks(&self, now_ms: i64) -> RepoResult<Vec<Task>>;
    /// Overwrites `assigned_to` only.
    fn update_task_assignment(&self, id: TaskId, user_id: UserId) -> RepoResult<Option<Task>>;
    /// Sets status and keeps `completed_at` consistent via `Task::apply_status`.
    fn update_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        now_ms: i64,
    ) -> RepoResult<Option<Task>>;
}

/// Full storage capability consumed by services, assignment and the monitor.
pub trait Store: UserRepository + DomainRepository + TaskRepository + Send + Sync {}

impl<T> Store for T where T: UserRepository + DomainRepository + TaskRepository + Send + Sync {}
