//! Domain model for the roster screen.
//!
//! # Responsibility
//! - Define the student record shared by store, roster and controller.
//!
//! # Invariants
//! - Every student is identified by its `student_id` alone.

pub mod student;
