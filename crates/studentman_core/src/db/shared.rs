//! Process-wide shared database handle.
//!
//! # Responsibility
//! - Lazily open the roster database once per process.
//! - Hand every caller the same connection behind a mutex.
//!
//! # Invariants
//! - First creation runs at most once; concurrent first callers block on it.
//! - The handle stays bound to the first path until process exit.

use super::open::open_db;
use super::{DbError, DbResult};
use log::{info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

static SHARED_DB: OnceCell<SharedDb> = OnceCell::new();

/// Shared connection owned by the process.
pub struct SharedDb {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SharedDb {
    /// Path the shared connection was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locks the connection for one use-case call.
    ///
    /// A poisoned lock is recovered: SQLite keeps its own consistency and
    /// the panicking caller's transaction was already rolled back on drop.
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("event=shared_db_lock module=db status=recovered reason=poisoned");
            poisoned.into_inner()
        })
    }
}

/// Returns the shared handle, opening `path` on first use.
///
/// # Errors
/// - Open/migration failures from [`open_db`] on first use.
/// - [`DbError::SharedPathConflict`] when already bound to another path.
pub fn shared_db(path: impl AsRef<Path>) -> DbResult<&'static SharedDb> {
    let requested = path.as_ref().to_path_buf();
    let shared = SHARED_DB.get_or_try_init(|| -> DbResult<SharedDb> {
        let conn = open_db(&requested)?;
        info!(
            "event=shared_db_init module=db status=ok path={}",
            requested.display()
        );
        Ok(SharedDb {
            path: requested.clone(),
            conn: Mutex::new(conn),
        })
    })?;

    if shared.path != requested {
        return Err(DbError::SharedPathConflict {
            active: shared.path.clone(),
            requested,
        });
    }
    Ok(shared)
}

#[cfg(test)]
mod tests {
    use super::shared_db;
    use crate::db::DbError;

    #[test]
    fn shared_db_reuses_handle_and_rejects_other_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.sqlite3");

        let first = shared_db(&path).unwrap();
        let second = shared_db(&path).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.path(), path.as_path());

        let count: i64 = first
            .lock()
            .query_row("SELECT COUNT(*) FROM student;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let other = dir.path().join("other.sqlite3");
        let err = shared_db(&other).err().unwrap();
        assert!(matches!(err, DbError::SharedPathConflict { .. }));
    }
}
