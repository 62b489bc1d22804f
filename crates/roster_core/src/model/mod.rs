//! Domain model for the employee directory.
//!
//! # Responsibility
//! - Define the canonical employee record shared by every layer.
//! - Keep schema validation of untyped candidate documents in one place.
//!
//! # Invariants
//! - Every persisted employee is identified by a stable [`employee::EmployeeId`].
//! - Typed records are schema-valid by construction; only drafts can fail
//!   validation.
//!
//! # See also
//! - `repo` for persistence contracts over these records.

pub mod employee;
