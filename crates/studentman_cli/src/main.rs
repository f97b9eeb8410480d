//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `studentman_core` linkage without the Flutter runtime.
//! - Report the roster size of the configured database.

use std::process::ExitCode;
use studentman_core::db::open_db;
use studentman_core::{CoreConfig, SqliteStudentRepository, StudentRepository};

fn main() -> ExitCode {
    println!("studentman_core ping={}", studentman_core::ping());
    println!("studentman_core version={}", studentman_core::core_version());

    match roster_count() {
        Ok((path, count)) => {
            println!("studentman_core db={path} students={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("studentman_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn roster_count() -> Result<(String, usize), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    studentman_core::init_logging_from_config(&config)?;
    let conn = open_db(&config.db_path)?;
    let repo = SqliteStudentRepository::try_new(&conn)?;
    Ok((config.db_path.display().to_string(), repo.count()?))
}
