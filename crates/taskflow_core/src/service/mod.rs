//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into request-level operations.
//! - Enforce role rules (leads vs members) and input validation.
//! - Keep front ends decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository contracts.
//! - Storage failures surface as [`ServiceError::Repo`]; missing records as
//!   the matching `*NotFound` variant.

use crate::model::task::TaskId;
use crate::model::user::{User, UserId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth_service;
pub mod domain_service;
pub mod stats_service;
pub mod task_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every use-case service.
#[derive(Debug)]
pub enum ServiceError {
    /// Request input failed validation.
    Validation(String),
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Missing, unknown or revoked session token.
    Unauthenticated,
    /// Actor role does not allow the operation.
    Forbidden(&'static str),
    /// Unique key already taken.
    Conflict(String),
    TaskNotFound(TaskId),
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Forbidden(reason) => write!(f, "forbidden: {reason}"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(message) => Self::Conflict(message),
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

pub(crate) fn require_lead(actor: &User, reason: &'static str) -> ServiceResult<()> {
    if actor.is_lead() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(reason))
    }
}

/// Trims `value`; blank input is a validation error naming `field`.
pub(crate) fn required_text(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text and folds blank input into `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
