//! Registration, login and session resolution.
//!
//! # Invariants
//! - Emails are unique after normalization.
//! - Password material only crosses the [`CredentialHasher`] boundary.

use crate::auth::{CredentialHasher, SessionRegistry};
use crate::model::user::{normalize_email, NewUser, Role, User, UserView};
use crate::repo::Store;
use crate::service::{optional_text, required_text, ServiceError, ServiceResult};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub preferred_domain: Option<String>,
}

/// Token plus the authenticated user's outward view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserView,
}

/// Auth use cases over a store, a hasher and a session registry.
pub struct AuthService<S: Store + ?Sized> {
    store: Arc<S>,
    hasher: Arc<dyn CredentialHasher>,
    sessions: SessionRegistry,
}

impl<S: Store + ?Sized> AuthService<S> {
    pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            store,
            hasher,
            sessions: SessionRegistry::new(),
        }
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// - `Validation` for blank name, malformed email or empty password.
    /// - `Conflict` when the email is already registered.
    pub fn register(&self, request: &RegisterRequest) -> ServiceResult<AuthSession> {
        let name = required_text("name", &request.name)?;
        let email = normalize_email(&request.email);
        if !EMAIL_RE.is_match(&email) {
            return Err(ServiceError::Validation(format!(
                "`{email}` is not a valid email address"
            )));
        }
        if request.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }
        if self.store.get_user_by_email(&email)?.is_some() {
            return Err(ServiceError::Conflict(format!("user already exists: {email}")));
        }

        let user = self.store.create_user(&NewUser {
            name,
            email,
            password_hash: self.hasher.hash(&request.password),
            role: request.role,
            preferred_domain: optional_text(request.preferred_domain.as_deref()),
        })?;
        info!(
            "event=user_register module=auth status=ok user_id={} role={}",
            user.id,
            user.role.as_str()
        );
        Ok(self.open_session(&user))
    }

    /// Verifies credentials and issues a session.
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let user = self
            .store
            .get_user_by_email(email)?
            .filter(|user| self.hasher.verify(password, &user.password_hash))
            .ok_or(ServiceError::InvalidCredentials)?;
        info!("event=user_login module=auth status=ok user_id={}", user.id);
        Ok(self.open_session(&user))
    }

    /// Resolves a session token to the current stored user.
    pub fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let user_id = self
            .sessions
            .resolve(token)
            .ok_or(ServiceError::Unauthenticated)?;
        self.store
            .get_user(user_id)?
            .ok_or(ServiceError::Unauthenticated)
    }

    /// Revokes a session token. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    fn open_session(&self, user: &User) -> AuthSession {
        AuthSession {
            token: self.sessions.issue(user.id),
            user: user.view(),
        }
    }
}
