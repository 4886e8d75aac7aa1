use ttyl::db;
use ttyl::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};
use ttyl::store::EntryStore;

#[test]
fn fresh_file_database_is_migrated_and_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");
    let conn = db::open_database(&path).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let health = db::check_database_health(&conn).unwrap();
    assert!(health.integrity_ok);
    assert_eq!(health.entry_count, 0);

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn migrations_are_idempotent() {
    let conn = db::open_memory_database().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn v1_database_gains_preferences_table() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), 1);

    run_migrations(&conn).unwrap();
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'preferences'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");
    {
        let store = EntryStore::open(&path).unwrap();
        store
            .set("journal-2024-01-01", &serde_json::json!({"content": "kept"}))
            .unwrap();
        store.preferences().set("theme", &"modern").unwrap();
    }

    let store = EntryStore::open(&path).unwrap();
    let value = store.get("journal-2024-01-01").unwrap().unwrap();
    assert_eq!(value["content"], "kept");
    assert_eq!(
        store.preferences().get::<String>("theme").unwrap().as_deref(),
        Some("modern")
    );
}
