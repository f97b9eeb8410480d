//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the record-store operations over the `student` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - Read paths return rows as stored; a blank legacy row stays reachable.
//! - Inserting an existing `studentId` is ignored, never overwritten.
//! - A key rename is one transaction: either both halves apply or neither.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::student::{Student, StudentValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_TABLE: &str = "student";
const STUDENT_COLUMNS: [&str; 2] = ["studentId", "studentName"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
///
/// Conflicts and missing rows are not errors here; they travel as
/// [`AddOutcome`], [`RenameOutcome`] or affected-row counts.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a conflict-ignoring insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was written with this SQLite rowid.
    Inserted { row_id: i64 },
    /// A row with the same `studentId` already existed; nothing was written.
    Ignored,
}

impl AddOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Result of a transactional key rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Old row removed and new row inserted in one commit.
    Renamed,
    /// No row exists under the old key; rolled back.
    SourceMissing,
    /// The new key is already taken by another row; rolled back.
    TargetTaken,
}

/// Record-store contract used by the roster controller.
pub trait StudentRepository {
    /// Returns every stored student in insertion order.
    fn get_all(&self) -> RepoResult<Vec<Student>>;
    /// Inserts one student, ignoring the write when the key exists.
    fn add(&self, student: &Student) -> RepoResult<AddOutcome>;
    /// Sets the name of the row with the same key; returns affected rows.
    fn update(&self, student: &Student) -> RepoResult<usize>;
    /// Removes the row with key `student_id`; returns affected rows.
    fn delete_by_key(&self, student_id: &str) -> RepoResult<usize>;
    /// Removes the row whose key matches `student`; returns affected rows.
    fn delete(&self, student: &Student) -> RepoResult<usize>;
    /// Moves a row from `old_id` to `student.student_id` atomically.
    fn rename(&self, old_id: &str, student: &Student) -> RepoResult<RenameOutcome>;
    /// Looks up one student by key.
    fn find(&self, student_id: &str) -> RepoResult<Option<Student>>;
    /// Returns the number of stored students.
    fn count(&self) -> RepoResult<usize>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - [`RepoError::UninitializedConnection`] when migrations were not run.
    /// - [`RepoError::MissingRequiredTable`] / [`RepoError::MissingRequiredColumn`]
    ///   when the schema does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_student_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT studentId, studentName
             FROM student
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn add(&self, student: &Student) -> RepoResult<AddOutcome> {
        student.validate()?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO student (studentId, studentName) VALUES (?1, ?2);",
            params![student.student_id, student.student_name],
        )?;

        if changed == 0 {
            debug!(
                "event=student_add module=repo status=ignored student_id={}",
                student.student_id
            );
            return Ok(AddOutcome::Ignored);
        }
        Ok(AddOutcome::Inserted {
            row_id: self.conn.last_insert_rowid(),
        })
    }

    fn update(&self, student: &Student) -> RepoResult<usize> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE student SET studentName = ?2 WHERE studentId = ?1;",
            params![student.student_id, student.student_name],
        )?;
        Ok(changed)
    }

    fn delete_by_key(&self, student_id: &str) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM student WHERE studentId = ?1;", [student_id])?;
        Ok(changed)
    }

    fn delete(&self, student: &Student) -> RepoResult<usize> {
        self.delete_by_key(student.student_id.as_str())
    }

    fn rename(&self, old_id: &str, student: &Student) -> RepoResult<RenameOutcome> {
        student.validate()?;

        // Dropping `tx` without commit rolls back.
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM student WHERE studentId = ?1;", [old_id])?;
        if removed == 0 {
            return Ok(RenameOutcome::SourceMissing);
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO student (studentId, studentName) VALUES (?1, ?2);",
            params![student.student_id, student.student_name],
        )?;
        if inserted == 0 {
            return Ok(RenameOutcome::TargetTaken);
        }

        tx.commit()?;
        Ok(RenameOutcome::Renamed)
    }

    fn find(&self, student_id: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT studentId, studentName
             FROM student
             WHERE studentId = ?1;",
        )?;
        let student = stmt.query_row([student_id], parse_student_row).optional()?;
        Ok(student)
    }

    fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM student;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative student count `{count}`")))
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    // Tables adopted from older installs may lack the NOT NULL constraint.
    let student = Student {
        student_id: row.get::<_, Option<String>>("studentId")?.unwrap_or_default(),
        student_name: row.get::<_, Option<String>>("studentName")?.unwrap_or_default(),
    };
    if let Err(err) = student.validate() {
        warn!(
            "event=student_read module=repo status=blank_field student_id={} reason={err}",
            student.student_id
        );
    }
    Ok(student)
}

fn ensure_student_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, STUDENT_TABLE)? {
        return Err(RepoError::MissingRequiredTable(STUDENT_TABLE));
    }

    for column in STUDENT_COLUMNS {
        if !table_has_column(conn, STUDENT_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: STUDENT_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
