//! FFI use-case API for the Flutter roster screen.
//!
//! # Responsibility
//! - Expose the add/edit/delete/undo/reload actions of the roster screen to Dart.
//! - Keep one process-wide screen session so undo survives between calls.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every roster call returns the roster as it stands after the call.
//! - Lock order is database first, then screen session.

use log::warn;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::{Mutex, MutexGuard};
use studentman_core::db::shared_db;
use studentman_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AddResult, ControllerError, CoreConfig, RosterController, ScreenState,
    SqliteStudentRepository, Student, StudentRepository,
};

static CONFIG: OnceCell<CoreConfig> = OnceCell::new();
static SCREEN: Lazy<Mutex<Option<ScreenState>>> = Lazy::new(|| Mutex::new(None));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path for rolling logs.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One roster row as passed to and from the student dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterItem {
    pub student_id: String,
    pub student_name: String,
}

/// Response envelope returned by every roster action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterResponse {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Human-readable outcome for snackbar/dialog display.
    pub message: String,
    /// Roster in display order after the action.
    pub items: Vec<RosterItem>,
    /// Whether an undo affordance should be shown.
    pub can_undo: bool,
}

impl RosterResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            items: Vec::new(),
            can_undo: false,
        }
    }
}

/// Returns the current roster, loading it from storage on first use.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_list() -> RosterResponse {
    run_action("roster_list", |_| Ok(String::new()))
}

/// Adds a student from the add dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_add(student_name: String, student_id: String) -> RosterResponse {
    run_action("roster_add", |ctl| {
        match ctl.add_student(&student_name, &student_id)? {
            AddResult::Added(_) => Ok("Student added.".to_string()),
            AddResult::DuplicateIgnored(student) => Ok(format!(
                "Student id {} already exists; nothing changed.",
                student.student_id
            )),
        }
    })
}

/// Applies the edit dialog to the row at `position`.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_edit(position: u32, student_name: String, student_id: String) -> RosterResponse {
    run_action("roster_edit", |ctl| {
        ctl.edit_student(position as usize, &student_name, &student_id)?;
        Ok("Student updated.".to_string())
    })
}

/// Deletes the row at `position` after the confirmation dialog.
///
/// On success `can_undo` is set and the message names the removed student.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_delete(position: u32) -> RosterResponse {
    run_action("roster_delete", |ctl| {
        let pending = ctl.delete_student(position as usize)?;
        Ok(format!("Deleted {}.", pending.student.student_name))
    })
}

/// Restores the most recent deletion.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_undo() -> RosterResponse {
    run_action("roster_undo", |ctl| match ctl.undo_delete()? {
        AddResult::Added(restored) => Ok(format!("Restored {}.", restored.student_name)),
        AddResult::DuplicateIgnored(student) => Ok(format!(
            "Student id {} is in use again; nothing restored.",
            student.student_id
        )),
    })
}

/// Re-reads the roster from storage and drops any pending undo.
///
/// Picks up rows written outside this session, e.g. by the CLI.
#[flutter_rust_bridge::frb(sync)]
pub fn roster_reload() -> RosterResponse {
    run_action("roster_reload", |ctl| {
        let was_in_sync = ctl.is_in_sync()?;
        ctl.reload()?;
        let count = ctl.repository().count()?;
        if was_in_sync {
            Ok(format!("{count} students; already up to date."))
        } else {
            Ok(format!("{count} students; reloaded from storage."))
        }
    })
}

fn run_action(
    action: &'static str,
    f: impl FnOnce(
        &mut RosterController<SqliteStudentRepository<'_>>,
    ) -> Result<String, ControllerError>,
) -> RosterResponse {
    let config = match resolve_config() {
        Ok(config) => config,
        Err(err) => return RosterResponse::failure(format!("{action} failed: {err}")),
    };
    let shared = match shared_db(&config.db_path) {
        Ok(shared) => shared,
        Err(err) => return RosterResponse::failure(format!("{action} failed: {err}")),
    };
    let conn = shared.lock();
    let repo = match SqliteStudentRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return RosterResponse::failure(format!("{action} failed: {err}")),
    };

    let mut screen = lock_screen();
    let mut ctl = match screen.take() {
        Some(state) => RosterController::resume(repo, state),
        None => match RosterController::load(repo, config.duplicate_policy) {
            Ok(ctl) => ctl,
            Err(err) => return RosterResponse::failure(format!("{action} failed: {err}")),
        },
    };

    let outcome = f(&mut ctl);
    let items = to_roster_items(ctl.roster().as_slice());
    let can_undo = ctl.pending_undo().is_some();
    *screen = Some(ctl.into_state());

    match outcome {
        Ok(message) => RosterResponse {
            ok: true,
            message,
            items,
            can_undo,
        },
        Err(err) => RosterResponse {
            ok: false,
            message: format!("{action} failed: {err}"),
            items,
            can_undo,
        },
    }
}

fn resolve_config() -> Result<&'static CoreConfig, String> {
    CONFIG
        .get_or_try_init(CoreConfig::from_env)
        .map_err(|err| err.to_string())
}

fn lock_screen() -> MutexGuard<'static, Option<ScreenState>> {
    SCREEN.lock().unwrap_or_else(|poisoned| {
        warn!("event=screen_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn to_roster_items(students: &[Student]) -> Vec<RosterItem> {
    students
        .iter()
        .map(|student| RosterItem {
            student_id: student.student_id.clone(),
            student_name: student.student_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, roster_add, roster_delete, roster_edit, roster_list,
        roster_reload, roster_undo, RosterResponse,
    };
    use std::sync::{Mutex, MutexGuard};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Roster tests share the process-wide session and must not interleave.
    static SESSION_TESTS: Mutex<()> = Mutex::new(());

    fn session_guard() -> MutexGuard<'static, ()> {
        SESSION_TESTS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn roster_add_rejects_blank_name() {
        let response = roster_add("   ".to_string(), unique_token("blank"));
        assert!(!response.ok);
        assert!(response.message.contains("name"), "{}", response.message);
    }

    #[test]
    fn roster_actions_cover_add_edit_delete_undo() {
        let _guard = session_guard();
        let id = unique_token("sv");
        let renamed_id = format!("{id}-new");

        let added = roster_add("Alice".to_string(), id.clone());
        assert!(added.ok, "{}", added.message);
        let position = position_of(&added, &id);

        let edited = roster_edit(position, "Alice Nguyen".to_string(), renamed_id.clone());
        assert!(edited.ok, "{}", edited.message);
        assert!(edited
            .items
            .iter()
            .any(|item| item.student_id == renamed_id && item.student_name == "Alice Nguyen"));

        let listed = roster_list();
        let position = position_of(&listed, &renamed_id);
        let deleted = roster_delete(position);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.can_undo);
        assert_eq!(deleted.message, "Deleted Alice Nguyen.");
        assert!(deleted.items.iter().all(|item| item.student_id != renamed_id));

        let undone = roster_undo();
        assert!(undone.ok, "{}", undone.message);
        assert!(!undone.can_undo);
        assert!(undone.items.iter().any(|item| item.student_id == renamed_id));

        let cleanup = roster_delete(position_of(&undone, &renamed_id));
        assert!(cleanup.ok, "{}", cleanup.message);
    }

    #[test]
    fn roster_reload_keeps_listed_rows() {
        let _guard = session_guard();
        let id = unique_token("reload");
        let added = roster_add("Carol".to_string(), id.clone());
        assert!(added.ok, "{}", added.message);

        let reloaded = roster_reload();
        assert!(reloaded.ok, "{}", reloaded.message);
        assert!(!reloaded.can_undo);
        assert!(reloaded.message.contains("students"), "{}", reloaded.message);
        let position = position_of(&reloaded, &id);

        let cleanup = roster_delete(position);
        assert!(cleanup.ok, "{}", cleanup.message);
    }

    fn position_of(response: &RosterResponse, student_id: &str) -> u32 {
        response
            .items
            .iter()
            .position(|item| item.student_id == student_id)
            .expect("student should be listed") as u32
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
