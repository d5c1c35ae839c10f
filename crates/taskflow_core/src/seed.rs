//! Default team bootstrap for empty stores.

use crate::auth::CredentialHasher;
use crate::model::domain::NewDomain;
use crate::model::user::{NewUser, Role};
use crate::repo::{RepoResult, Store};
use log::info;
use serde::Serialize;

pub const DEFAULT_PASSWORD: &str = "password123";
pub const DEFAULT_LEAD_EMAIL: &str = "lead@example.com";

const DEFAULT_DOMAINS: &[(&str, &str)] = &[
    ("Design", "UI/UX design, prototyping, and visual assets"),
    ("Development", "Frontend and backend development tasks"),
    ("Research", "Market research and user studies"),
];

const DEFAULT_MEMBERS: &[(&str, &str, &str)] = &[
    ("Sarah Wilson", "sarah@example.com", "Design"),
    ("Mike Chen", "mike@example.com", "Development"),
    ("Lisa Park", "lisa@example.com", "Research"),
];

/// What [`seed_defaults`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub domains: usize,
}

/// Seeds one lead, three domains and one member per domain.
///
/// Does nothing when the store already has any user. Every seeded account
/// uses [`DEFAULT_PASSWORD`].
pub fn seed_defaults<S>(store: &S, hasher: &dyn CredentialHasher) -> RepoResult<SeedSummary>
where
    S: Store + ?Sized,
{
    if !store.list_users()?.is_empty() {
        info!("event=seed module=seed status=skipped reason=not_empty");
        return Ok(SeedSummary::default());
    }

    let lead = store.create_user(&NewUser {
        name: "John Doe".to_string(),
        email: DEFAULT_LEAD_EMAIL.to_string(),
        password_hash: hasher.hash(DEFAULT_PASSWORD),
        role: Role::Lead,
        preferred_domain: None,
    })?;

    for (name, description) in DEFAULT_DOMAINS {
        store.create_domain(&NewDomain {
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            created_by: lead.id,
        })?;
    }
    for (name, email, domain) in DEFAULT_MEMBERS {
        store.create_user(&NewUser {
            name: (*name).to_string(),
            email: (*email).to_string(),
            password_hash: hasher.hash(DEFAULT_PASSWORD),
            role: Role::Member,
            preferred_domain: Some((*domain).to_string()),
        })?;
    }

    let summary = SeedSummary {
        users: 1 + DEFAULT_MEMBERS.len(),
        domains: DEFAULT_DOMAINS.len(),
    };
    info!(
        "event=seed module=seed status=ok users={} domains={}",
        summary.users, summary.domains
    );
    Ok(summary)
}
