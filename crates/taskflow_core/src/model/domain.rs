//! Work domain model.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

pub type DomainId = i64;

/// Named work category scoping both user preference and task classification.
///
/// Names are unique. Domains are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// Insert payload for a new domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
}
