use medstash_core::db::migrations::latest_version;
use medstash_core::db::{ensure_schema_ready, open_db, open_db_in_memory, DbError};
use medstash_core::{RepoError, SqliteMedicationRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "medications");
    assert_table_exists(&conn, "active_substances");
    assert_table_exists(&conn, "medication_substances");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medstash.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "medications");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = ensure_schema_ready(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaNotReady { db_version: 0, expected } if expected == latest_version()
    ));

    let repo_err = SqliteMedicationRepository::try_new(&conn).err().unwrap();
    assert!(matches!(repo_err, RepoError::Db(DbError::SchemaNotReady { .. })));
}

#[test]
fn schema_check_constraints_reject_invalid_rows() {
    let conn = open_db_in_memory().unwrap();

    let bad_month = conn.execute(
        "INSERT INTO medications (name, presentation, expiration_year, expiration_month)
         VALUES ('Advil', 'pill', 2025, 13);",
        [],
    );
    assert!(bad_month.is_err());

    let bad_presentation = conn.execute(
        "INSERT INTO medications (name, presentation, expiration_year, expiration_month)
         VALUES ('Advil', 'bandage', 2025, 8);",
        [],
    );
    assert!(bad_presentation.is_err());

    let dangling_link = conn.execute(
        "INSERT INTO medication_substances (medication_id, substance_id, position)
         VALUES (404, 404, 0);",
        [],
    );
    assert!(dangling_link.is_err(), "foreign keys must be enforced");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
