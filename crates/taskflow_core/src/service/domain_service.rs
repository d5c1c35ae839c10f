//! Work domain use cases.

use crate::model::domain::{Domain, NewDomain};
use crate::model::user::User;
use crate::repo::Store;
use crate::service::{optional_text, require_lead, required_text, ServiceError, ServiceResult};
use log::info;
use std::sync::Arc;

pub struct DomainService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> DomainService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> ServiceResult<Vec<Domain>> {
        Ok(self.store.list_domains()?)
    }

    /// Creates a domain owned by `actor`.
    ///
    /// # Errors
    /// - `Forbidden` unless `actor` is a lead.
    /// - `Validation` for a blank name; `Conflict` for a taken name.
    pub fn create(
        &self,
        actor: &User,
        name: &str,
        description: Option<&str>,
    ) -> ServiceResult<Domain> {
        require_lead(actor, "team lead access required")?;
        let name = required_text("domain name", name)?;
        if self.store.get_domain_by_name(&name)?.is_some() {
            return Err(ServiceError::Conflict(format!("domain already exists: {name}")));
        }

        let domain = self.store.create_domain(&NewDomain {
            name,
            description: optional_text(description),
            created_by: actor.id,
        })?;
        info!(
            "event=domain_create module=domain status=ok domain_id={} created_by={}",
            domain.id, actor.id
        );
        Ok(domain)
    }
}
