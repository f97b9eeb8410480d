//! In-memory roster projection.
//!
//! # Responsibility
//! - Hold the ordered list of students currently shown on screen.
//! - Offer position-based edits matching list-view interactions.
//!
//! # Invariants
//! - The roster never touches persistence; the controller keeps it in step
//!   with the store.
//! - Out-of-range positions are reported, never panicked on.

use crate::model::student::Student;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Position errors raised by roster edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterError {
    PositionOutOfRange { position: usize, len: usize },
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionOutOfRange { position, len } => {
                write!(f, "roster position {position} out of range (len {len})")
            }
        }
    }
}

impl Error for RosterError {}

/// Ordered list of students in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from store rows, keeping their order.
    pub fn from_records(students: Vec<Student>) -> Self {
        Self { students }
    }

    /// Appends a student to the end of the list.
    pub fn add_student(&mut self, student: Student) {
        self.students.push(student);
    }

    /// Replaces the entry at `position`.
    pub fn update_student(&mut self, student: Student, position: usize) -> Result<(), RosterError> {
        let len = self.students.len();
        let slot = self
            .students
            .get_mut(position)
            .ok_or(RosterError::PositionOutOfRange { position, len })?;
        *slot = student;
        Ok(())
    }

    /// Removes and returns the entry at `position`.
    pub fn remove_student(&mut self, position: usize) -> Result<Student, RosterError> {
        self.check_position(position)?;
        Ok(self.students.remove(position))
    }

    pub fn get_student(&self, position: usize) -> Option<&Student> {
        self.students.get(position)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn as_slice(&self) -> &[Student] {
        &self.students
    }

    /// Returns the first position holding `student_id`.
    pub fn position_of(&self, student_id: &str) -> Option<usize> {
        self.iter()
            .position(|student| student.student_id == student_id)
    }

    pub fn contains_id(&self, student_id: &str) -> bool {
        self.position_of(student_id).is_some()
    }

    /// Set of keys currently shown, for comparison with the store.
    pub fn key_set(&self) -> BTreeSet<&str> {
        self.iter()
            .map(|student| student.student_id.as_str())
            .collect()
    }

    fn check_position(&self, position: usize) -> Result<(), RosterError> {
        if position < self.students.len() {
            Ok(())
        } else {
            Err(RosterError::PositionOutOfRange {
                position,
                len: self.students.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Roster, RosterError};
    use crate::model::student::Student;

    fn student(id: &str, name: &str) -> Student {
        Student::new(id, name).unwrap()
    }

    #[test]
    fn add_appends_in_display_order() {
        let mut roster = Roster::new();
        roster.add_student(student("2", "Bob"));
        roster.add_student(student("1", "Alice"));

        let ids: Vec<_> = roster.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(roster.position_of("1"), Some(1));
    }

    #[test]
    fn update_replaces_entry_in_place() {
        let mut roster = Roster::from_records(vec![student("1", "Alice"), student("2", "Bob")]);
        roster.update_student(student("3", "Carol"), 0).unwrap();

        assert_eq!(roster.get_student(0), Some(&student("3", "Carol")));
        assert_eq!(roster.len(), 2);
        assert!(!roster.contains_id("1"));
    }

    #[test]
    fn remove_returns_entry_and_shifts_tail() {
        let mut roster = Roster::from_records(vec![
            student("1", "Alice"),
            student("2", "Bob"),
            student("3", "Carol"),
        ]);
        let removed = roster.remove_student(1).unwrap();

        assert_eq!(removed, student("2", "Bob"));
        assert_eq!(roster.get_student(1), Some(&student("3", "Carol")));
    }

    #[test]
    fn out_of_range_positions_are_errors() {
        let mut roster = Roster::from_records(vec![student("1", "Alice")]);

        assert_eq!(
            roster.remove_student(1),
            Err(RosterError::PositionOutOfRange {
                position: 1,
                len: 1
            })
        );
        assert!(roster.update_student(student("2", "Bob"), 5).is_err());
        assert!(roster.get_student(1).is_none());
        assert_eq!(roster.len(), 1);
    }
}
