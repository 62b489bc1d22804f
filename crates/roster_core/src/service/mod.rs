//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model validation and repository calls into directory-level
//!   APIs.
//! - Keep embedding layers decoupled from storage details.

pub mod employee_service;
