mod common;

use common::{add_completed_task, add_member, add_task, stores, HOUR_MS, NOW};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use taskflow_core::{
    DeadlineMonitor, Domain, DomainRepository, MemoryStore, MonitorScheduler, NewDomain, NewTask,
    NewUser, Reassignment, RepoError, RepoResult, Task, TaskId, TaskRepository, TaskStatus, User,
    UserId, UserRepository,
};

#[test]
fn overdue_task_moves_to_less_loaded_member() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        let overdue = add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);

        let monitor = DeadlineMonitor::new(Arc::clone(&store));
        let report = monitor.tick_at(NOW).unwrap();

        assert_eq!(report.scanned, 1, "{adapter}");
        assert_eq!(
            report.reassigned,
            vec![Reassignment {
                task_id: overdue.id,
                from: Some(b.id),
                to: a.id,
            }],
            "{adapter}"
        );

        let after = store.get_task(overdue.id).unwrap().unwrap();
        assert_eq!(after.assigned_to, Some(a.id), "{adapter}");
        assert_eq!(after.status, TaskStatus::Pending, "{adapter}");
        assert_eq!(after.deadline, overdue.deadline, "{adapter}");
        assert_eq!(after.completed_at, None, "{adapter}");
    }
}

#[test]
fn sole_member_keeps_overdue_task() {
    for (adapter, store) in stores() {
        let c = add_member(&*store, "Cal", "Research");
        let overdue = add_task(&*store, "Research", Some(c.id), NOW - HOUR_MS);

        let report = DeadlineMonitor::new(Arc::clone(&store))
            .tick_at(NOW)
            .unwrap();

        assert_eq!(report.scanned, 1, "{adapter}");
        assert!(report.reassigned.is_empty(), "{adapter}");
        assert_eq!(report.unchanged, 1, "{adapter}");
        assert_eq!(
            store.get_task(overdue.id).unwrap().unwrap(),
            overdue,
            "{adapter}"
        );
    }
}

#[test]
fn overdue_task_in_empty_domain_stays_unassigned() {
    for (adapter, store) in stores() {
        let overdue = add_task(&*store, "Legal", None, NOW - HOUR_MS);

        let report = DeadlineMonitor::new(Arc::clone(&store))
            .tick_at(NOW)
            .unwrap();

        assert_eq!(report.unchanged, 1, "{adapter}");
        assert_eq!(
            store.get_task(overdue.id).unwrap().unwrap().assigned_to,
            None,
            "{adapter}"
        );
    }
}

#[test]
fn unassigned_overdue_task_gets_an_assignee() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let overdue = add_task(&*store, "Design", None, NOW - HOUR_MS);

        let report = DeadlineMonitor::new(Arc::clone(&store))
            .tick_at(NOW)
            .unwrap();

        assert_eq!(report.reassigned.len(), 1, "{adapter}");
        assert_eq!(report.reassigned[0].from, None, "{adapter}");
        assert_eq!(
            store.get_task(overdue.id).unwrap().unwrap().assigned_to,
            Some(a.id),
            "{adapter}"
        );
    }
}

#[test]
fn completed_and_not_yet_due_tasks_are_not_swept() {
    for (adapter, store) in stores() {
        add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        add_completed_task(&*store, "Design", b.id);
        add_completed_task(&*store, "Design", b.id);
        let due_now = add_task(&*store, "Design", Some(b.id), NOW);
        let future = add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);

        let report = DeadlineMonitor::new(Arc::clone(&store))
            .tick_at(NOW)
            .unwrap();

        assert_eq!(report.scanned, 0, "{adapter}");
        for task in [due_now, future] {
            assert_eq!(
                store.get_task(task.id).unwrap().unwrap().assigned_to,
                Some(b.id),
                "{adapter}"
            );
        }
    }
}

#[test]
fn overdue_sweep_keeps_rebalancing_across_ticks() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        let first = add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);
        add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);
        add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);

        let monitor = DeadlineMonitor::new(Arc::clone(&store));
        let report = monitor.tick_at(NOW).unwrap();
        assert_eq!(report.reassigned.len(), 2, "{adapter}");
        assert_eq!(report.unchanged, 1, "{adapter}");

        // Load is recomputed per task, so the next sweep moves the earliest
        // task back to the member who is now lighter.
        let report = monitor.tick_at(NOW).unwrap();
        assert!(report.reassigned.contains(&Reassignment {
            task_id: first.id,
            from: Some(a.id),
            to: b.id,
        }), "{adapter}");
    }
}

#[test]
fn single_overdue_task_second_tick_changes_nothing() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);
        let overdue = add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);

        let monitor = DeadlineMonitor::new(Arc::clone(&store));
        assert_eq!(monitor.tick_at(NOW).unwrap().reassigned.len(), 1, "{adapter}");
        let second = monitor.tick_at(NOW).unwrap();

        assert!(second.reassigned.is_empty(), "{adapter}");
        assert_eq!(second.unchanged, 1, "{adapter}");
        assert_eq!(
            store.get_task(overdue.id).unwrap().unwrap().assigned_to,
            Some(a.id),
            "{adapter}"
        );
    }
}

#[test]
fn failure_in_one_domain_does_not_block_others() {
    let store = Arc::new(FlakyStore::default());
    store.fail_domain.store(true, Ordering::SeqCst);
    let a = add_member(&*store, "Ann", "Design");
    let b = add_member(&*store, "Ben", "Design");
    add_member(&*store, "Bob", FlakyStore::BROKEN_DOMAIN);
    let broken = add_task(&*store, FlakyStore::BROKEN_DOMAIN, None, NOW - 2 * HOUR_MS);
    let healthy = add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);

    let report = DeadlineMonitor::new(Arc::clone(&store))
        .tick_at(NOW)
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.reassigned.len(), 1);
    assert_eq!(
        store.get_task(healthy.id).unwrap().unwrap().assigned_to,
        Some(a.id)
    );
    assert_eq!(store.get_task(broken.id).unwrap().unwrap().assigned_to, None);
}

#[test]
fn panic_on_one_task_does_not_abort_the_sweep() {
    let store = Arc::new(FlakyStore::default());
    store.panic_domain.store(true, Ordering::SeqCst);
    let a = add_member(&*store, "Ann", "Design");
    let b = add_member(&*store, "Ben", "Design");
    add_member(&*store, "Vic", FlakyStore::PANIC_DOMAIN);
    let volatile = add_task(&*store, FlakyStore::PANIC_DOMAIN, None, NOW - 2 * HOUR_MS);
    let healthy = add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);

    let report = DeadlineMonitor::new(Arc::clone(&store))
        .tick_at(NOW)
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(
        report.reassigned,
        vec![Reassignment {
            task_id: healthy.id,
            from: Some(b.id),
            to: a.id,
        }]
    );
    assert_eq!(store.get_task(volatile.id).unwrap().unwrap().assigned_to, None);
}

#[test]
fn task_vanishing_mid_sweep_is_skipped() {
    let store = Arc::new(FlakyStore::default());
    add_member(&*store, "Ann", "Design");
    let b = add_member(&*store, "Ben", "Design");
    add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);
    store.vanish.store(true, Ordering::SeqCst);
    add_task(&*store, "Design", Some(b.id), NOW - HOUR_MS);

    let report = DeadlineMonitor::new(Arc::clone(&store))
        .tick_at(NOW)
        .unwrap();

    assert_eq!(report.scanned, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.reassigned.is_empty());
}

#[test]
fn overdue_query_failure_fails_the_tick() {
    let store = Arc::new(FlakyStore::default());
    store.fail_overdue.store(true, Ordering::SeqCst);

    let err = DeadlineMonitor::new(store).tick_at(NOW).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn scheduler_sweeps_until_stopped() {
    let store = Arc::new(MemoryStore::new());
    let a = add_member(&*store, "Ann", "Design");
    let b = add_member(&*store, "Ben", "Design");
    add_task(&*store, "Design", Some(b.id), i64::MAX);
    let overdue = add_task(&*store, "Design", Some(b.id), 0);

    let handle = MonitorScheduler::start(
        DeadlineMonitor::new(Arc::clone(&store)),
        Duration::from_millis(10),
    )
    .unwrap();
    wait_for(|| handle.completed_ticks() >= 1);
    handle.stop();

    assert_eq!(
        store.get_task(overdue.id).unwrap().unwrap().assigned_to,
        Some(a.id)
    );
}

#[test]
fn scheduler_survives_failing_and_panicking_ticks() {
    let store = Arc::new(FlakyStore::default());
    store.fail_overdue.store(true, Ordering::SeqCst);
    store.panic_overdue.store(true, Ordering::SeqCst);

    let handle =
        MonitorScheduler::start(DeadlineMonitor::new(Arc::clone(&store)), Duration::from_millis(5))
            .unwrap();
    wait_for(|| handle.completed_ticks() >= 3);
    let ticks = handle.completed_ticks();
    drop(handle);

    assert!(ticks >= 3);
}

fn wait_for<F: Fn() -> bool>(condition: F) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Memory store with switchable faults.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    /// Fail domain task lookups for `BROKEN_DOMAIN`.
    fail_domain: AtomicBool,
    /// Panic on domain task lookups for `PANIC_DOMAIN`.
    panic_domain: AtomicBool,
    /// Fail the overdue query.
    fail_overdue: AtomicBool,
    /// Panic on every other overdue query.
    panic_overdue: AtomicBool,
    overdue_calls: AtomicU64,
    /// Report every assignment update as not-found.
    vanish: AtomicBool,
}

impl FlakyStore {
    const BROKEN_DOMAIN: &'static str = "Broken";
    const PANIC_DOMAIN: &'static str = "Volatile";
}

impl UserRepository for FlakyStore {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.inner.create_user(user)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.inner.get_user(id)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.inner.get_user_by_email(email)
    }

    fn update_user_domain(&self, id: UserId, domain: &str) -> RepoResult<Option<User>> {
        self.inner.update_user_domain(id, domain)
    }

    fn users_by_domain(&self, domain: &str) -> RepoResult<Vec<User>> {
        self.inner.users_by_domain(domain)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        self.inner.list_users()
    }
}

impl DomainRepository for FlakyStore {
    fn create_domain(&self, domain: &NewDomain) -> RepoResult<Domain> {
        self.inner.create_domain(domain)
    }

    fn get_domain_by_name(&self, name: &str) -> RepoResult<Option<Domain>> {
        self.inner.get_domain_by_name(name)
    }

    fn list_domains(&self) -> RepoResult<Vec<Domain>> {
        self.inner.list_domains()
    }
}

impl TaskRepository for FlakyStore {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        self.inner.create_task(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.inner.get_task(id)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.inner.list_tasks()
    }

    fn tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<Task>> {
        self.inner.tasks_by_user(user_id)
    }

    fn tasks_by_domain(&self, domain: &str) -> RepoResult<Vec<Task>> {
        if domain == Self::BROKEN_DOMAIN && self.fail_domain.load(Ordering::SeqCst) {
            return Err(RepoError::InvalidData("injected domain failure".to_string()));
        }
        if domain == Self::PANIC_DOMAIN && self.panic_domain.load(Ordering::SeqCst) {
            panic!("injected domain panic");
        }
        self.inner.tasks_by_domain(domain)
    }

    fn overdue_tasks(&self, now_ms: i64) -> RepoResult<Vec<Task>> {
        let call = self.overdue_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_overdue.load(Ordering::SeqCst) && call % 2 == 0 {
            panic!("injected overdue panic");
        }
        if self.fail_overdue.load(Ordering::SeqCst) {
            return Err(RepoError::InvalidData("injected overdue failure".to_string()));
        }
        self.inner.overdue_tasks(now_ms)
    }

    fn update_task_assignment(&self, id: TaskId, user_id: UserId) -> RepoResult<Option<Task>> {
        if self.vanish.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.update_task_assignment(id, user_id)
    }

    fn update_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        now_ms: i64,
    ) -> RepoResult<Option<Task>> {
        self.inner.update_task_status(id, status, now_ms)
    }
}
