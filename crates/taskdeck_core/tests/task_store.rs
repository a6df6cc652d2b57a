use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    Clock, ManualClock, NotificationKind, Notifier, Priority, SqliteSlotStorage, StoreConfig,
    StoreError, TaskDraft, TaskId, TaskPatch, TaskStats, TaskStore,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap())
}

fn open_store<'c>(conn: &'c Connection, clock: &ManualClock) -> TaskStore<SqliteSlotStorage<'c>> {
    TaskStore::open(
        SqliteSlotStorage::new(conn),
        Notifier::new(Box::new(clock.clone())),
        StoreConfig::default(),
    )
}

fn kinds(store: &TaskStore<SqliteSlotStorage<'_>>) -> Vec<NotificationKind> {
    store.notifier().active().iter().map(|n| n.kind).collect()
}

#[test]
fn fresh_store_starts_with_seed_statistics() {
    let conn = open_db_in_memory().unwrap();
    let store = open_store(&conn, &clock());

    assert_eq!(
        store.stats(),
        TaskStats {
            total: 5,
            completed: 2,
            pending: 3,
            progress_percentage: 40,
        }
    );
    assert_eq!(store.completed_tasks().len(), 2);
    assert_eq!(store.pending_tasks().len(), 3);
    assert!(store.notifier().active().is_empty());
}

#[test]
fn add_assigns_next_id_and_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let mut store = open_store(&conn, &clock);

    let task = store
        .add(
            TaskDraft::new("  Ship release ")
                .with_description(" notes ")
                .with_priority(Priority::High),
        )
        .unwrap();

    assert_eq!(task.id, TaskId(6));
    assert_eq!(task.title, "Ship release");
    assert_eq!(task.description, "notes");
    assert_eq!(task.created_at, clock.now());
    assert_eq!(store.list().len(), 6);
    assert_eq!(kinds(&store), vec![NotificationKind::Success]);
    assert!(store.notifier().active()[0].message.contains("Ship release"));
}

#[test]
fn add_with_blank_title_changes_nothing_and_notifies_one_error() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());

    for blank in ["", "   ", "\t\n"] {
        let err = store.add(TaskDraft::new(blank)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTitle));
    }

    assert_eq!(store.list().len(), 5);
    assert_eq!(kinds(&store), vec![NotificationKind::Error; 3]);
}

#[test]
fn add_with_markup_stores_cleaned_text_and_warns() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());

    let task = store
        .add(TaskDraft::new("Read docs").with_description(r#"<img src=x onerror="x()">see wiki"#))
        .unwrap();

    assert_eq!(task.description, "see wiki");
    assert_eq!(
        kinds(&store),
        vec![NotificationKind::Warning, NotificationKind::Success]
    );
}

#[test]
fn ids_continue_from_max_after_deletion() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());

    store.delete(TaskId(5)).unwrap();
    store.delete(TaskId(2)).unwrap();
    let added = store.add(TaskDraft::new("next")).unwrap();

    assert_eq!(added.id, TaskId(5));
    let removed_max = store.delete(TaskId(5)).unwrap();
    assert_eq!(removed_max.title, "next");
    assert_eq!(store.add(TaskDraft::new("again")).unwrap().id, TaskId(5));
}

#[test]
fn delete_names_task_in_error_notification() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let title = store.get(TaskId(3)).unwrap().title.clone();

    let removed = store.delete(TaskId(3)).unwrap();

    assert_eq!(removed.title, title);
    assert!(store.get(TaskId(3)).is_none());
    let active = store.notifier().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].kind, NotificationKind::Error);
    assert!(active[0].message.contains(&title));
}

#[test]
fn deleting_missing_id_is_a_silent_no_op() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let before = store.list().to_vec();
    let published = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&published);
    store.subscribe(move |_| *counter.borrow_mut() += 1);

    assert!(store.delete(TaskId(42)).is_none());
    assert!(store.toggle_completion(TaskId(42)).is_none());

    assert_eq!(store.list(), before.as_slice());
    assert!(store.notifier().active().is_empty());
    assert_eq!(*published.borrow(), 1);
}

#[test]
fn toggle_flips_one_task_and_reports_new_state() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let before = store.list().to_vec();

    let toggled = store.toggle_completion(TaskId(1)).unwrap();

    assert!(toggled.completed);
    for (old, new) in before.iter().zip(store.list()).skip(1) {
        assert_eq!(old, new);
    }
    let active = store.notifier().active();
    assert_eq!(active[0].kind, NotificationKind::Info);
    assert!(active[0].message.contains("completed"));

    store.toggle_completion(TaskId(1)).unwrap();
    assert!(store.notifier().active()[1].message.contains("reopened"));
    assert_eq!(store.list(), before.as_slice());
}

#[test]
fn update_strips_script_from_title_and_warns() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());

    let patch = TaskPatch {
        title: Some("<script>x</script>Hi".to_string()),
        ..TaskPatch::default()
    };
    let updated = store.update(TaskId(3), patch).unwrap().unwrap();

    assert_eq!(updated.title, "Hi");
    assert_eq!(store.get(TaskId(3)).unwrap().title, "Hi");
    assert_eq!(
        kinds(&store),
        vec![NotificationKind::Warning, NotificationKind::Success]
    );
}

#[test]
fn update_merges_non_text_fields_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let original = store.get(TaskId(5)).unwrap().clone();

    let patch = TaskPatch {
        completed: Some(true),
        priority: Some(Priority::Medium),
        ..TaskPatch::default()
    };
    let updated = store.update(TaskId(5), patch).unwrap().unwrap();

    assert_eq!(updated.title, original.title);
    assert_eq!(updated.description, original.description);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.completed);
    assert_eq!(updated.priority, Priority::Medium);
}

#[test]
fn update_with_blank_title_aborts_without_mutation() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let before = store.list().to_vec();

    let patch = TaskPatch {
        title: Some("   ".to_string()),
        priority: Some(Priority::Low),
        ..TaskPatch::default()
    };
    let err = store.update(TaskId(1), patch).unwrap_err();

    assert!(matches!(err, StoreError::InvalidTitle));
    assert_eq!(store.list(), before.as_slice());
    assert_eq!(kinds(&store), vec![NotificationKind::Error]);
}

#[test]
fn update_on_missing_id_still_sanitizes_but_does_not_report_success() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let before = store.list().to_vec();

    let patch = TaskPatch {
        description: Some("<script>alert(1)</script>".to_string()),
        ..TaskPatch::default()
    };
    assert!(store.update(TaskId(99), patch).unwrap().is_none());

    assert_eq!(store.list(), before.as_slice());
    assert_eq!(kinds(&store), vec![NotificationKind::Warning]);
}

#[test]
fn subscribers_receive_replay_then_every_change_in_order() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let events = Rc::new(RefCell::new(Vec::new()));

    let tasks_log = Rc::clone(&events);
    store.subscribe(move |tasks| tasks_log.borrow_mut().push(format!("tasks:{}", tasks.len())));
    let stats_log = Rc::clone(&events);
    store.subscribe_stats(move |stats| {
        stats_log
            .borrow_mut()
            .push(format!("stats:{}%", stats.progress_percentage))
    });

    store.toggle_completion(TaskId(1)).unwrap();
    store.add(TaskDraft::new("extra")).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "tasks:5", "stats:40%", "tasks:5", "stats:60%", "tasks:6", "stats:50%",
        ]
    );
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let conn = open_db_in_memory().unwrap();
    let mut store = open_store(&conn, &clock());
    let calls = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&calls);
    let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
    assert!(store.unsubscribe(id));
    store.toggle_completion(TaskId(2)).unwrap();

    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn reset_restores_seed_with_new_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let mut store = open_store(&conn, &clock);
    store.delete(TaskId(1)).unwrap();
    store.add(TaskDraft::new("temp")).unwrap();

    clock.advance(Duration::from_secs(60));
    store.reset();

    assert_eq!(store.list().len(), 5);
    assert_eq!(store.stats().progress_percentage, 40);
    assert!(store
        .list()
        .iter()
        .all(|task| task.created_at == clock.now()));
    assert_eq!(
        store.notifier().active().last().unwrap().kind,
        NotificationKind::Info
    );
}

#[test]
fn notifications_from_store_expire_after_ttl() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let mut store = open_store(&conn, &clock);

    store.toggle_completion(TaskId(4)).unwrap();
    assert_eq!(store.notifier().active().len(), 1);

    clock.advance(Duration::from_millis(3000));
    assert_eq!(store.notifier_mut().tick(), 1);
    assert!(store.notifier().active().is_empty());
}
