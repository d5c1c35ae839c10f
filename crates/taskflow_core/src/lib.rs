//! Core logic for the Taskflow team task manager.
//!
//! Tasks are auto-assigned to the least-loaded member of their domain, and a
//! background monitor moves overdue pending tasks to whoever is least loaded
//! at sweep time.

pub mod assignment;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod repo;
pub mod seed;
pub mod service;

pub use assignment::{least_loaded, select_assignee};
pub use auth::{Blake3Hasher, CredentialHasher, SessionRegistry};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::domain::{Domain, DomainId, NewDomain};
pub use model::now_epoch_ms;
pub use model::task::{NewTask, Priority, Task, TaskId, TaskStatus, TaskValidationError};
pub use model::user::{NewUser, Role, User, UserId, UserView};
pub use monitor::{DeadlineMonitor, MonitorHandle, MonitorScheduler, Reassignment, TickReport};
pub use repo::{
    DomainRepository, MemoryStore, RepoError, RepoResult, SqliteStore, Store, TaskRepository,
    UserRepository,
};
pub use seed::{seed_defaults, SeedSummary};
pub use service::auth_service::{AuthService, AuthSession, RegisterRequest};
pub use service::domain_service::DomainService;
pub use service::stats_service::{StatsService, TaskStats};
pub use service::task_service::{CreateTaskRequest, TaskFilter, TaskService};
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
