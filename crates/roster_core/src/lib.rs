//! Core domain logic for the Roster employee directory.
//! This crate is the single source of truth for the employee schema contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{
    Employee, EmployeeDraft, EmployeeId, FieldError, ValidationErrors, ValueKind, FIELD_DEPARTMENT,
    FIELD_FIRST_NAME, FIELD_LAST_NAME,
};
pub use repo::employee_repo::{
    EmployeeFilter, EmployeePatch, EmployeeRepository, RepoError, RepoResult, SaveOutcome,
    SqliteEmployeeRepository,
};
pub use service::employee_service::{EmployeeService, EmployeeServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
