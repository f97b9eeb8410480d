//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record-store contract the controller depends on.
//! - Isolate SQLite query details from screen orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Student::validate()` before persistence.
//! - Key conflicts and missing rows are reported as values, not errors.

pub mod student_repo;
