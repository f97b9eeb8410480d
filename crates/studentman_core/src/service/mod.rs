//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and roster calls into screen-level actions.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod roster_service;
