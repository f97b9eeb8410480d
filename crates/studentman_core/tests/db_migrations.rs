use rusqlite::Connection;
use studentman_core::db::migrations::{latest_version, schema_version};
use studentman_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_creates_student_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "student");
}

#[test]
fn reopening_file_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("student_db.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO student (studentId, studentName) VALUES ('20210001', 'Alice');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let name: String = conn
        .query_row(
            "SELECT studentName FROM student WHERE studentId = '20210001';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(name, "Alice");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn primary_key_rejects_plain_duplicate_insert() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO student (studentId, studentName) VALUES ('1', 'Alice');",
        [],
    )
    .unwrap();

    let err = conn.execute(
        "INSERT INTO student (studentId, studentName) VALUES ('1', 'Bob');",
        [],
    );
    assert!(err.is_err());
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
