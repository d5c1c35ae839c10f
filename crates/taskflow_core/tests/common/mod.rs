#![allow(dead_code)]

use std::sync::Arc;
use taskflow_core::{
    MemoryStore, NewTask, NewUser, Priority, Role, SqliteStore, Store, Task, TaskStatus, User,
    UserId,
};

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const NOW: i64 = 1_700_000_000_000;

/// Every adapter, freshly opened.
pub fn stores() -> Vec<(&'static str, Arc<dyn Store>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new()) as Arc<dyn Store>),
        (
            "sqlite",
            Arc::new(SqliteStore::open_in_memory().unwrap()) as Arc<dyn Store>,
        ),
    ]
}

pub fn add_user(store: &dyn Store, name: &str, role: Role, domain: Option<&str>) -> User {
    store
        .create_user(&NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "unused".to_string(),
            role,
            preferred_domain: domain.map(str::to_string),
        })
        .unwrap()
}

pub fn add_member(store: &dyn Store, name: &str, domain: &str) -> User {
    add_user(store, name, Role::Member, Some(domain))
}

pub fn add_task(
    store: &dyn Store,
    domain: &str,
    assigned_to: Option<UserId>,
    deadline: i64,
) -> Task {
    let created_at = store.list_tasks().unwrap().len() as i64;
    store
        .create_task(&NewTask {
            title: format!("{domain} task {created_at}"),
            description: None,
            domain: domain.to_string(),
            assigned_to,
            deadline,
            priority: Priority::Medium,
            created_by: 1,
            created_at,
        })
        .unwrap()
}

pub fn add_completed_task(store: &dyn Store, domain: &str, assigned_to: UserId) -> Task {
    let task = add_task(store, domain, Some(assigned_to), NOW + HOUR_MS);
    store
        .update_task_status(task.id, TaskStatus::Completed, NOW - HOUR_MS)
        .unwrap()
        .unwrap()
}
