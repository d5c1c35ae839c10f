//! In-process store backed by ordered maps.
//!
//! Used for tests, demos and the CLI when no database path is configured.
//! Keys are store-assigned ids starting at `1`, so map order equals creation
//! order.

use crate::model::domain::{Domain, DomainId, NewDomain};
use crate::model::task::{NewTask, Task, TaskId, TaskStatus};
use crate::model::user::{normalize_email, NewUser, User, UserId};
use crate::repo::{DomainRepository, RepoError, RepoResult, TaskRepository, UserRepository};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    domains: BTreeMap<DomainId, Domain>,
    tasks: BTreeMap<TaskId, Task>,
    last_user_id: UserId,
    last_domain_id: DomainId,
    last_task_id: TaskId,
}

impl MemoryState {
    /// Matching tasks newest first; fails on the first invalid record.
    fn collect_tasks<F>(&self, mut keep: F) -> RepoResult<Vec<Task>>
    where
        F: FnMut(&Task) -> bool,
    {
        let mut tasks = self
            .tasks
            .values()
            .filter(|task| keep(task))
            .map(checked_task)
            .collect::<RepoResult<Vec<Task>>>()?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }
}

fn checked_task(task: &Task) -> RepoResult<Task> {
    task.validate()?;
    Ok(task.clone())
}

/// Store adapter holding all records in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryStore {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let email = normalize_email(&user.email);
        let mut state = self.state.write();
        if state.users.values().any(|existing| existing.email == email) {
            return Err(RepoError::Conflict(format!("email already registered: {email}")));
        }

        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            name: user.name.clone(),
            email,
            password_hash: user.password_hash.clone(),
            role: user.role,
            preferred_domain: user.preferred_domain.clone(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn update_user_domain(&self, id: UserId, domain: &str) -> RepoResult<Option<User>> {
        let mut state = self.state.write();
        Ok(state.users.get_mut(&id).map(|user| {
            user.preferred_domain = Some(domain.to_string());
            user.clone()
        }))
    }

    fn users_by_domain(&self, domain: &str) -> RepoResult<Vec<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .filter(|user| user.prefers(domain))
            .cloned()
            .collect())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.state.read().users.values().cloned().collect())
    }
}

impl DomainRepository for MemoryStore {
    fn create_domain(&self, domain: &NewDomain) -> RepoResult<Domain> {
        let mut state = self.state.write();
        if state.domains.values().any(|existing| existing.name == domain.name) {
            return Err(RepoError::Conflict(format!("domain already exists: {}", domain.name)));
        }

        state.last_domain_id += 1;
        let created = Domain {
            id: state.last_domain_id,
            name: domain.name.clone(),
            description: domain.description.clone(),
            created_by: domain.created_by,
        };
        state.domains.insert(created.id, created.clone());
        Ok(created)
    }

    fn get_domain_by_name(&self, name: &str) -> RepoResult<Option<Domain>> {
        Ok(self
            .state
            .read()
            .domains
            .values()
            .find(|domain| domain.name == name)
            .cloned())
    }

    fn list_domains(&self) -> RepoResult<Vec<Domain>> {
        Ok(self.state.read().domains.values().cloned().collect())
    }
}

impl TaskRepository for MemoryStore {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let mut state = self.state.write();
        let created = task.clone().into_task(state.last_task_id + 1);
        created.validate()?;

        state.last_task_id = created.id;
        state.tasks.insert(created.id, created.clone());
        Ok(created)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.state.read().tasks.get(&id).map(checked_task).transpose()
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.state.read().collect_tasks(|_| true)
    }

    fn tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<Task>> {
        self.state
            .read()
            .collect_tasks(|task| task.assigned_to == Some(user_id))
    }

    fn tasks_by_domain(&self, domain: &str) -> RepoResult<Vec<Task>> {
        self.state.read().collect_tasks(|task| task.domain == domain)
    }

    fn overdue_tasks(&self, now_ms: i64) -> RepoResult<Vec<Task>> {
        let mut tasks = self
            .state
            .read()
            .tasks
            .values()
            .filter(|task| task.is_overdue_at(now_ms))
            .map(checked_task)
            .collect::<RepoResult<Vec<Task>>>()?;
        tasks.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    fn update_task_assignment(&self, id: TaskId, user_id: UserId) -> RepoResult<Option<Task>> {
        let mut state = self.state.write();
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };

        let mut updated = task.clone();
        updated.assigned_to = Some(user_id);
        updated.validate()?;
        *task = updated.clone();
        Ok(Some(updated))
    }

    fn update_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        now_ms: i64,
    ) -> RepoResult<Option<Task>> {
        let mut state = self.state.write();
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };

        let mut updated = task.clone();
        updated.apply_status(status, now_ms);
        updated.validate()?;
        *task = updated.clone();
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::model::domain::NewDomain;
    use crate::model::task::{NewTask, Priority, TaskStatus};
    use crate::repo::{DomainRepository, RepoError, TaskRepository};

    #[test]
    fn domain_names_are_unique() {
        let store = MemoryStore::new();
        let new = NewDomain {
            name: "Design".to_string(),
            description: None,
            created_by: 1,
        };
        store.create_domain(&new).unwrap();
        let err = store.create_domain(&new).unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[test]
    fn invalid_task_does_not_consume_an_id() {
        let store = MemoryStore::new();
        let mut new = NewTask {
            title: " ".to_string(),
            description: None,
            domain: "Design".to_string(),
            assigned_to: None,
            deadline: 10,
            priority: Priority::Medium,
            created_by: 1,
            created_at: 1,
        };
        assert!(matches!(store.create_task(&new), Err(RepoError::Validation(_))));

        new.title = "Logo".to_string();
        assert_eq!(store.create_task(&new).unwrap().id, 1);
    }

    #[test]
    fn reads_reject_records_breaking_the_completion_invariant() {
        let store = MemoryStore::new();
        let task = store
            .create_task(&NewTask {
                title: "Logo".to_string(),
                description: None,
                domain: "Design".to_string(),
                assigned_to: None,
                deadline: 10,
                priority: Priority::Medium,
                created_by: 1,
                created_at: 1,
            })
            .unwrap();
        if let Some(stored) = store.state.write().tasks.get_mut(&task.id) {
            stored.status = TaskStatus::Completed;
        }

        assert!(matches!(store.get_task(task.id), Err(RepoError::Validation(_))));
        assert!(matches!(store.list_tasks(), Err(RepoError::Validation(_))));
        assert!(matches!(
            store.tasks_by_domain("Design"),
            Err(RepoError::Validation(_))
        ));
        assert!(matches!(
            store.update_task_assignment(task.id, 2),
            Err(RepoError::Validation(_))
        ));
    }
}
