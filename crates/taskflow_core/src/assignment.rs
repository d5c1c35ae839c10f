//! Least-loaded task assignment.
//!
//! # Responsibility
//! - Pick the domain member who should receive a new or reassigned task.
//!
//! # Invariants
//! - Load counts every task tagged with the domain, in any status. Completed
//!   history still counts as load.
//! - Tasks assigned to users outside the domain are ignored.
//! - Ties go to the first user in store order (ascending id); selection is
//!   deterministic.
//! - Read-only: callers perform the assignment write.

use crate::model::task::Task;
use crate::model::user::{User, UserId};
use crate::repo::{RepoResult, TaskRepository, UserRepository};
use log::debug;
use std::collections::HashMap;

/// Selects the least-loaded member of `domain`.
///
/// Returns `Ok(None)` when nobody prefers `domain`; the task then stays
/// unassigned.
///
/// # Errors
/// Propagates storage failures unchanged.
pub fn select_assignee<R>(store: &R, domain: &str) -> RepoResult<Option<UserId>>
where
    R: UserRepository + TaskRepository + ?Sized,
{
    let users = store.users_by_domain(domain)?;
    if users.is_empty() {
        debug!("event=assign_select module=assignment status=no_candidates domain={domain}");
        return Ok(None);
    }

    let tasks = store.tasks_by_domain(domain)?;
    let selected = least_loaded(&users, &tasks);
    debug!(
        "event=assign_select module=assignment status=ok domain={} candidates={} domain_tasks={} selected={:?}",
        domain,
        users.len(),
        tasks.len(),
        selected
    );
    Ok(selected)
}

/// Picks the user with the strictly smallest task count among `users`.
///
/// Scans `users` in the given order and keeps the first user reaching a new
/// minimum.
pub fn least_loaded(users: &[User], tasks: &[Task]) -> Option<UserId> {
    let mut load: HashMap<UserId, usize> = users.iter().map(|user| (user.id, 0)).collect();
    for assignee in tasks.iter().filter_map(|task| task.assigned_to) {
        if let Some(count) = load.get_mut(&assignee) {
            *count += 1;
        }
    }

    let mut selected: Option<(UserId, usize)> = None;
    for user in users {
        let count = load.get(&user.id).copied().unwrap_or_default();
        if selected.map_or(true, |(_, min)| count < min) {
            selected = Some((user.id, count));
        }
    }
    selected.map(|(user_id, _)| user_id)
}
