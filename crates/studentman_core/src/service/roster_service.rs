//! Roster screen controller.
//!
//! # Responsibility
//! - Sequence store writes and roster edits for add/edit/delete/undo.
//! - Hold the single pending-undo record.
//!
//! # Invariants
//! - The roster is only touched after the matching store write succeeded.
//! - After every completed call the roster and store hold the same key set.
//! - At most one deletion is undoable; a newer deletion replaces it.
//! - Every failure is returned to the caller; nothing is swallowed.

use crate::config::DuplicateIdPolicy;
use crate::model::student::{Student, StudentValidationError};
use crate::repo::student_repo::{RenameOutcome, RepoError, StudentRepository};
use crate::roster::{Roster, RosterError};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failures surfaced to the UI layer.
#[derive(Debug)]
pub enum ControllerError {
    /// Name or id is blank.
    Validation(StudentValidationError),
    /// Another student already uses this id.
    DuplicateId(String),
    /// The store has no row for this id.
    NotFound(String),
    /// The requested roster position does not exist.
    Roster(RosterError),
    /// Undo requested with no pending deletion.
    NothingToUndo,
    /// Storage failure.
    Repo(RepoError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "student id already exists: {id}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Roster(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for ControllerError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RosterError> for ControllerError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Result of an add or undo request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddResult {
    /// Stored and appended to the roster.
    Added(Student),
    /// Id already present; nothing changed. Only under [`DuplicateIdPolicy::Ignore`].
    DuplicateIgnored(Student),
}

/// The most recent deletion, kept for one-level undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndo {
    pub student: Student,
    /// Roster position the student occupied before deletion.
    pub position: usize,
}

/// Controller state detached from its repository.
///
/// Lets callers that borrow a connection per request (the FFI facade) keep
/// the roster and pending undo between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    pub roster: Roster,
    pub pending_undo: Option<PendingUndo>,
    pub duplicate_policy: DuplicateIdPolicy,
}

/// Screen controller over a record store and its roster projection.
pub struct RosterController<R: StudentRepository> {
    repo: R,
    roster: Roster,
    pending_undo: Option<PendingUndo>,
    duplicate_policy: DuplicateIdPolicy,
}

impl<R: StudentRepository> RosterController<R> {
    /// Builds a controller with the roster loaded from `repo`.
    pub fn load(repo: R, duplicate_policy: DuplicateIdPolicy) -> ControllerResult<Self> {
        let roster = Roster::from_records(repo.get_all()?);
        info!(
            "event=roster_load module=service status=ok count={}",
            roster.len()
        );
        Ok(Self {
            repo,
            roster,
            pending_undo: None,
            duplicate_policy,
        })
    }

    /// Reattaches previously detached state to a repository.
    pub fn resume(repo: R, state: ScreenState) -> Self {
        Self {
            repo,
            roster: state.roster,
            pending_undo: state.pending_undo,
            duplicate_policy: state.duplicate_policy,
        }
    }

    /// Detaches roster and pending undo from the repository.
    pub fn into_state(self) -> ScreenState {
        ScreenState {
            roster: self.roster,
            pending_undo: self.pending_undo,
            duplicate_policy: self.duplicate_policy,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn pending_undo(&self) -> Option<&PendingUndo> {
        self.pending_undo.as_ref()
    }

    pub fn duplicate_policy(&self) -> DuplicateIdPolicy {
        self.duplicate_policy
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Adds a student from dialog input.
    ///
    /// # Errors
    /// - `Validation` for blank fields.
    /// - `DuplicateId` when the id exists and the policy is `Reject`.
    pub fn add_student(&mut self, name: &str, student_id: &str) -> ControllerResult<AddResult> {
        let student = Student::new(student_id, name)?;
        self.store_and_append(student, "student_add")
    }

    /// Edits the student at `position`; a changed id is a transactional rename.
    ///
    /// The roster entry is replaced only after the store accepted the change.
    pub fn edit_student(
        &mut self,
        position: usize,
        name: &str,
        student_id: &str,
    ) -> ControllerResult<Student> {
        let current = self.student_at(position)?.clone();
        let updated = Student::new(student_id, name)?;

        if updated.student_id == current.student_id {
            if self.repo.update(&updated)? == 0 {
                return Err(ControllerError::NotFound(current.student_id));
            }
        } else {
            match self.repo.rename(&current.student_id, &updated)? {
                RenameOutcome::Renamed => {}
                RenameOutcome::SourceMissing => {
                    return Err(ControllerError::NotFound(current.student_id));
                }
                RenameOutcome::TargetTaken => {
                    return Err(ControllerError::DuplicateId(updated.student_id));
                }
            }
        }

        self.roster.update_student(updated.clone(), position)?;
        info!(
            "event=student_edit module=service status=ok old_id={} student_id={}",
            current.student_id, updated.student_id
        );
        Ok(updated)
    }

    /// Deletes the student at `position` and makes it the pending undo.
    pub fn delete_student(&mut self, position: usize) -> ControllerResult<PendingUndo> {
        let target = self.student_at(position)?.clone();

        if self.repo.delete(&target)? == 0 {
            return Err(ControllerError::NotFound(target.student_id));
        }

        let removed = self.roster.remove_student(position)?;
        if let Some(previous) = self.pending_undo.as_ref() {
            info!(
                "event=undo_superseded module=service status=ok student_id={}",
                previous.student.student_id
            );
        }
        let pending = PendingUndo {
            student: removed,
            position,
        };
        self.pending_undo = Some(pending.clone());
        info!(
            "event=student_delete module=service status=ok student_id={}",
            target.student_id
        );
        Ok(pending)
    }

    /// Re-inserts the pending deletion and appends it to the roster.
    ///
    /// Pending undo is cleared whether or not the re-insert succeeds. An id
    /// taken in the meantime follows the duplicate policy, as for add.
    ///
    /// # Errors
    /// - `NothingToUndo` when no deletion is pending.
    /// - `DuplicateId` when the id was re-used and the policy is `Reject`.
    pub fn undo_delete(&mut self) -> ControllerResult<AddResult> {
        let pending = self
            .pending_undo
            .take()
            .ok_or(ControllerError::NothingToUndo)?;
        self.store_and_append(pending.student, "student_undo")
    }

    /// Replaces the roster with the store contents and drops pending undo.
    pub fn reload(&mut self) -> ControllerResult<()> {
        self.roster = Roster::from_records(self.repo.get_all()?);
        self.pending_undo = None;
        Ok(())
    }

    /// Whether roster and store currently hold the same key set.
    pub fn is_in_sync(&self) -> ControllerResult<bool> {
        let stored = self.repo.get_all()?;
        let store_keys: BTreeSet<&str> = stored.iter().map(|s| s.student_id.as_str()).collect();
        Ok(stored.len() == self.roster.len() && store_keys == self.roster.key_set())
    }

    fn store_and_append(
        &mut self,
        student: Student,
        event: &'static str,
    ) -> ControllerResult<AddResult> {
        if self.repo.add(&student)?.is_inserted() {
            self.roster.add_student(student.clone());
            info!(
                "event={event} module=service status=ok student_id={}",
                student.student_id
            );
            return Ok(AddResult::Added(student));
        }

        warn!(
            "event={event} module=service status=duplicate student_id={}",
            student.student_id
        );
        if !self.roster.contains_id(&student.student_id) {
            // Stored by someone else since the last load.
            warn!(
                "event=roster_drift module=service status=out_of_sync student_id={}",
                student.student_id
            );
        }
        match self.duplicate_policy {
            DuplicateIdPolicy::Ignore => Ok(AddResult::DuplicateIgnored(student)),
            DuplicateIdPolicy::Reject => Err(ControllerError::DuplicateId(student.student_id)),
        }
    }

    fn student_at(&self, position: usize) -> ControllerResult<&Student> {
        self.roster
            .get_student(position)
            .ok_or(ControllerError::Roster(RosterError::PositionOutOfRange {
                position,
                len: self.roster.len(),
            }))
    }
}
