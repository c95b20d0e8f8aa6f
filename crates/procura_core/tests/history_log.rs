use procura_core::model::history::{ActionKind, HistoryLog};
use procura_core::service::history_service::{history_for_item, recent};
use procura_core::{seed_snapshot, HistoryRecorder, PassthroughHasher, User, UserRole};

fn actor() -> User {
    User::new("u2", "c1", "Ana Planejamento", UserRole::Planner)
}

#[test]
fn entries_are_prepended_in_reverse_chronological_order() {
    let mut recorder = HistoryRecorder::new();
    let mut logs = seed_snapshot(chrono::Utc::now(), &PassthroughHasher).history_logs;
    let seeded = logs.clone();
    let user = actor();

    for n in 0..25 {
        let entry = recorder
            .record(
                &mut logs,
                Some(&user),
                ActionKind::Update,
                format!("Matrix: item {n}"),
                "Executed value changed",
                Some("mx1"),
            )
            .unwrap();
        assert_eq!(logs[0], entry);
    }

    assert_eq!(logs.len(), seeded.len() + 25);
    assert_eq!(&logs[25..], seeded.as_slice());
    assert_eq!(logs[0].target, "Matrix: item 24");
    assert!(logs
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[test]
fn entry_copies_actor_identity_and_tenant() {
    let mut recorder = HistoryRecorder::new();
    let mut logs = Vec::new();

    let entry = recorder
        .record(
            &mut logs,
            Some(&actor()),
            ActionKind::Create,
            "Planning: Office supplies",
            "Created a new budget planning record",
            Some("a10"),
        )
        .unwrap();

    assert_eq!(entry.company_id, "c1");
    assert_eq!(entry.user_id, "u2");
    assert_eq!(entry.user_name, "Ana Planejamento");
    assert_eq!(entry.user_avatar, "AP");
    assert_eq!(entry.item_id.as_deref(), Some("a10"));
}

#[test]
fn missing_actor_leaves_history_unchanged() {
    let mut recorder = HistoryRecorder::new();
    let mut logs = seed_snapshot(chrono::Utc::now(), &PassthroughHasher).history_logs;
    let before: Vec<HistoryLog> = logs.clone();

    let entry = recorder.record(
        &mut logs,
        None,
        ActionKind::Create,
        "Planning: Office supplies",
        "Created a new budget planning record",
        None,
    );

    assert!(entry.is_none());
    assert_eq!(logs, before);
}

#[test]
fn login_is_recorded_against_the_system_target() {
    let mut recorder = HistoryRecorder::new();
    let mut logs = Vec::new();

    recorder.record_login(&mut logs, &actor()).unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, ActionKind::Login);
    assert_eq!(logs[0].target, "System");
    assert!(logs[0].item_id.is_none());
}

#[test]
fn item_history_filters_by_item_and_keeps_order() {
    let mut recorder = HistoryRecorder::new();
    let mut logs = Vec::new();
    let user = actor();
    for item in ["a1", "a2", "a1"] {
        recorder.record(
            &mut logs,
            Some(&user),
            ActionKind::Update,
            "Planning",
            "Edited",
            Some(item),
        );
    }

    let for_a1 = history_for_item(&logs, "a1");
    assert_eq!(for_a1.len(), 2);
    assert_eq!(for_a1[0].id, logs[0].id);
    assert_eq!(recent(&logs, 2).len(), 2);
    assert_eq!(recent(&logs, 10).len(), 3);
}
