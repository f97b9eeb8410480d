//! Core domain logic for the student roster screen.
//! This crate owns the store, the roster projection and the screen controller.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod roster;
pub mod service;

pub use config::{ConfigError, CoreConfig, DuplicateIdPolicy};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::student::{Student, StudentValidationError};
pub use repo::student_repo::{
    AddOutcome, RenameOutcome, RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use roster::{Roster, RosterError};
pub use service::roster_service::{
    AddResult, ControllerError, ControllerResult, PendingUndo, RosterController, ScreenState,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
