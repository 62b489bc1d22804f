//! Repository layer contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the document-style CRUD contract for employee storage.
//! - Keep SQLite query details out of service orchestration.
//!
//! # Invariants
//! - Filter semantics are identical across find, update and delete
//!   operations.
//! - Repositories return semantic errors (`NotFound`) alongside transport
//!   errors, never panics.

pub mod employee_repo;
