//! Student domain model.
//!
//! # Responsibility
//! - Define the record exchanged between dialogs, roster and store.
//! - Validate user input before it reaches persistence.
//!
//! # Invariants
//! - `student_id` is the sole identifying key and is never blank.
//! - `student_name` is never blank when constructed through [`Student::new`].
//! - Field values are stored exactly as entered; whitespace is never rewritten.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One student row as shown in the roster and stored in `student`.
///
/// Serialized with the dialog field names (`studentId`, `studentName`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Primary key. Changing it is a rename, not an update.
    pub student_id: String,
    /// Display name, no uniqueness constraint.
    pub student_name: String,
}

/// Input validation failures for [`Student`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    /// `student_id` is empty after trimming.
    EmptyId,
    /// `student_name` is empty after trimming.
    EmptyName,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "student id must not be empty"),
            Self::EmptyName => write!(f, "student name must not be empty"),
        }
    }
}

impl Error for StudentValidationError {}

impl Student {
    /// Builds a validated record from raw dialog input.
    ///
    /// Both values are kept verbatim; only the blank check looks past
    /// surrounding whitespace.
    ///
    /// # Errors
    /// - [`StudentValidationError::EmptyId`] when the id is blank.
    /// - [`StudentValidationError::EmptyName`] when the name is blank.
    pub fn new(
        student_id: impl AsRef<str>,
        student_name: impl AsRef<str>,
    ) -> Result<Self, StudentValidationError> {
        let student = Self {
            student_id: student_id.as_ref().to_string(),
            student_name: student_name.as_ref().to_string(),
        };
        student.validate()?;
        Ok(student)
    }

    /// Checks field invariants on an already built record.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.student_id.trim().is_empty() {
            return Err(StudentValidationError::EmptyId);
        }
        if self.student_name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        Ok(())
    }
}
