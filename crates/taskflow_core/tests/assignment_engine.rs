mod common;

use common::{add_completed_task, add_member, add_task, add_user, stores, HOUR_MS, NOW};
use taskflow_core::{select_assignee, Role};

#[test]
fn domain_without_members_selects_nobody() {
    for (adapter, store) in stores() {
        let lead = add_user(&*store, "Lead", Role::Lead, None);
        add_member(&*store, "Dev", "Development");
        add_task(&*store, "Design", Some(lead.id), NOW);

        assert_eq!(
            select_assignee(&*store, "Design").unwrap(),
            None,
            "{adapter}"
        );
    }
}

#[test]
fn idle_member_beats_member_with_completed_history() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        for _ in 0..3 {
            add_completed_task(&*store, "Design", b.id);
        }

        assert_eq!(
            select_assignee(&*store, "Design").unwrap(),
            Some(a.id),
            "{adapter}"
        );
    }
}

#[test]
fn completed_history_still_outweighs_fewer_pending_tasks() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        add_completed_task(&*store, "Design", a.id);
        add_completed_task(&*store, "Design", a.id);
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);

        assert_eq!(
            select_assignee(&*store, "Design").unwrap(),
            Some(b.id),
            "{adapter}"
        );
    }
}

#[test]
fn equal_load_breaks_tie_toward_earliest_member() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);
        add_task(&*store, "Design", Some(a.id), NOW + HOUR_MS);

        for _ in 0..3 {
            assert_eq!(
                select_assignee(&*store, "Design").unwrap(),
                Some(a.id),
                "{adapter}"
            );
        }
    }
}

#[test]
fn load_is_counted_only_within_the_domain() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        for _ in 0..4 {
            add_task(&*store, "Research", Some(a.id), NOW + HOUR_MS);
        }
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);

        assert_eq!(
            select_assignee(&*store, "Design").unwrap(),
            Some(a.id),
            "{adapter}"
        );
    }
}

#[test]
fn tasks_held_by_former_members_are_ignored() {
    for (adapter, store) in stores() {
        let a = add_member(&*store, "Ann", "Design");
        let b = add_member(&*store, "Ben", "Design");
        add_task(&*store, "Design", Some(a.id), NOW + HOUR_MS);
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);
        add_task(&*store, "Design", Some(b.id), NOW + HOUR_MS);

        store.update_user_domain(b.id, "Research").unwrap().unwrap();
        let c = add_member(&*store, "Cat", "Design");
        add_task(&*store, "Design", Some(c.id), NOW + HOUR_MS);

        // Ann and Cat both hold one Design task; Ben's two no longer count.
        assert_eq!(
            select_assignee(&*store, "Design").unwrap(),
            Some(a.id),
            "{adapter}"
        );
    }
}

#[test]
fn domain_names_match_exactly() {
    for (adapter, store) in stores() {
        add_member(&*store, "Ann", "Design");
        assert_eq!(
            select_assignee(&*store, "design").unwrap(),
            None,
            "{adapter}"
        );
    }
}
