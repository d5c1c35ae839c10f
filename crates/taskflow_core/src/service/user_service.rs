//! User preference and listing use cases.

use crate::model::user::{User, UserView};
use crate::repo::Store;
use crate::service::{required_text, ServiceError, ServiceResult};
use log::info;
use std::sync::Arc;

pub struct UserService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> UserService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Sets the actor's own preferred domain.
    ///
    /// The name is a free reference; it is not checked against existing domains.
    pub fn set_preferred_domain(&self, actor: &User, domain: &str) -> ServiceResult<UserView> {
        let domain = required_text("domain", domain)?;
        let updated = self
            .store
            .update_user_domain(actor.id, &domain)?
            .ok_or(ServiceError::UserNotFound(actor.id))?;
        info!(
            "event=user_domain_update module=user status=ok user_id={}",
            updated.id
        );
        Ok(updated.view())
    }

    /// Lists users visible to `actor`.
    ///
    /// With `domain` set, returns that domain's members for any actor.
    /// Otherwise leads see everyone and members see only themselves.
    pub fn list(&self, actor: &User, domain: Option<&str>) -> ServiceResult<Vec<UserView>> {
        let users = match domain.map(str::trim).filter(|name| !name.is_empty()) {
            Some(domain) => self.store.users_by_domain(domain)?,
            None if actor.is_lead() => self.store.list_users()?,
            None => vec![actor.clone()],
        };
        Ok(users.iter().map(User::view).collect())
    }
}
