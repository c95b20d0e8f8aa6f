use procura_core::db::migrations::{latest_version, pending_versions};
use procura_core::db::{open_db, open_db_in_memory, DbError};
use procura_core::seed::seed_history;
use procura_core::{
    seed_snapshot, AppConfig, PassthroughHasher, ProcuraApp, RepoError, SnapshotGateway,
    SqliteSnapshotRepository,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "snapshot_collections");
    assert_table_exists(&conn, "snapshot_saves");
    assert!(pending_versions(&conn).unwrap().is_empty());
}

#[test]
fn rejected_migration_step_names_the_step_and_keeps_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clash.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE snapshot_collections (name TEXT PRIMARY KEY, payload TEXT);
         CREATE INDEX snapshot_saves ON snapshot_collections (payload);
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MigrationFailed { version, name, .. } => {
            assert_eq!(version, 2);
            assert_eq!(name, "snapshot_saves");
        }
        other => panic!("unexpected error: {other}"),
    }
    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
    assert_eq!(pending_versions(&conn).unwrap(), vec![2]);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("procura.db");

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();

    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_database_loads_as_none() {
    let repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    assert!(repo.load_all().unwrap().is_none());
}

#[test]
fn saved_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("procura.db");
    let snapshot = seed_snapshot(chrono::Utc::now(), &PassthroughHasher);

    let mut repo = SqliteSnapshotRepository::open(&path).unwrap();
    repo.save_all(&snapshot).unwrap();
    repo.save_all(&snapshot).unwrap();
    drop(repo);

    let reopened = SqliteSnapshotRepository::open(&path).unwrap();
    assert_eq!(reopened.load_all().unwrap(), Some(snapshot));
    let rows: i64 = reopened
        .connection()
        .query_row("SELECT COUNT(*) FROM snapshot_collections;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 12);
}

#[test]
fn save_records_bookkeeping_row() {
    let mut repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    assert_eq!(repo.last_save().unwrap(), None);
    let snapshot = seed_snapshot(chrono::Utc::now(), &PassthroughHasher);
    let before = chrono::Utc::now() - chrono::Duration::seconds(1);

    repo.save_all(&snapshot).unwrap();
    repo.save_all(&snapshot).unwrap();

    let record = repo.last_save().unwrap().unwrap();
    assert_eq!(record.total_records, snapshot.total_len());
    assert_eq!(record.core_version, procura_core::core_version());
    assert!(record.saved_at >= before);
    let rows: i64 = repo
        .connection()
        .query_row("SELECT COUNT(*) FROM snapshot_saves;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn missing_required_collection_is_invalid_data() {
    let mut repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    repo.save_all(&seed_snapshot(chrono::Utc::now(), &PassthroughHasher))
        .unwrap();
    repo.connection()
        .execute("DELETE FROM snapshot_collections WHERE name = 'users';", [])
        .unwrap();

    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("users")));
}

#[test]
fn missing_history_collection_loads_default_history() {
    let mut repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    let mut saved = seed_snapshot(chrono::Utc::now(), &PassthroughHasher);
    saved.history_logs.clear();
    repo.save_all(&saved).unwrap();
    repo.connection()
        .execute(
            "DELETE FROM snapshot_collections WHERE name = 'historyLogs';",
            [],
        )
        .unwrap();

    let loaded = repo.load_all().unwrap().unwrap();

    let expected_ids: Vec<String> = seed_history(chrono::Utc::now())
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    let loaded_ids: Vec<String> = loaded.history_logs.iter().map(|e| e.id.clone()).collect();
    assert_eq!(loaded_ids, expected_ids);
    assert_eq!(loaded.users, saved.users);
}

#[test]
fn stored_empty_history_stays_empty() {
    let mut repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    let mut saved = seed_snapshot(chrono::Utc::now(), &PassthroughHasher);
    saved.history_logs.clear();
    repo.save_all(&saved).unwrap();

    assert!(repo.load_all().unwrap().unwrap().history_logs.is_empty());
}

#[test]
fn malformed_payload_is_invalid_data() {
    let mut repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    repo.save_all(&seed_snapshot(chrono::Utc::now(), &PassthroughHasher))
        .unwrap();
    repo.connection()
        .execute(
            "UPDATE snapshot_collections SET payload = '{not json' WHERE name = 'audits';",
            [],
        )
        .unwrap();

    assert!(matches!(repo.load_all(), Err(RepoError::InvalidData(_))));
}

#[test]
fn app_over_sqlite_reloads_its_own_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default().with_db_path(dir.path().join("procura.db"));

    let mut app = ProcuraApp::open(&config, &PassthroughHasher).unwrap();
    app.login("u2").unwrap();
    let expected = app.snapshot().clone();
    let (_, flushed) = app.shutdown();
    flushed.unwrap();

    let reopened = ProcuraApp::open(&config, &PassthroughHasher).unwrap();
    assert_eq!(reopened.snapshot(), &expected);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "missing table {table_name}");
}
