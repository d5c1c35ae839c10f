//! User domain model.
//!
//! # Invariants
//! - `email` is unique across users and stored normalized (trimmed, lowercase).
//! - `preferred_domain` is a domain *name* reference, not a foreign key.
//! - `password_hash` never leaves core; outward callers get [`UserView`].

use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Team role granted at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates domains and tasks, sees everything.
    Lead,
    /// Works tasks in a preferred domain.
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Opaque value produced by the credential collaborator.
    pub password_hash: String,
    pub role: Role,
    pub preferred_domain: Option<String>,
}

impl User {
    pub fn is_lead(&self) -> bool {
        self.role == Role::Lead
    }

    /// Returns whether this user currently prefers `domain`.
    pub fn prefers(&self, domain: &str) -> bool {
        self.preferred_domain.as_deref() == Some(domain)
    }

    /// Outward projection without credential material.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            preferred_domain: self.preferred_domain.clone(),
        }
    }
}

/// Insert payload for a new user. The store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub preferred_domain: Option<String>,
}

/// User shape safe to hand to front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub preferred_domain: Option<String>,
}

/// Normalizes an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
