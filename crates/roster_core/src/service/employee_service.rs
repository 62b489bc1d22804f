//! Employee use-case service.
//!
//! # Responsibility
//! - Validate candidate documents before any persistence write (`hire`).
//! - Provide directory entry points (`hire`, `transfer`, `dismiss`) plus
//!   document CRUD pass-throughs.
//!
//! # Invariants
//! - Schema validation runs before storage is touched; invalid drafts never
//!   reach the repository.
//! - Bulk update pass-throughs keep repository semantics and skip schema
//!   validation.

use crate::model::employee::{Employee, EmployeeDraft, EmployeeId, ValidationErrors};
use crate::repo::employee_repo::{
    EmployeeFilter, EmployeePatch, EmployeeRepository, RepoError, RepoResult, SaveOutcome,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for employee use-cases.
#[derive(Debug)]
pub enum EmployeeServiceError {
    /// Candidate document violates the employee schema.
    Validation(ValidationErrors),
    /// Target employee does not exist.
    EmployeeNotFound(EmployeeId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for EmployeeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EmployeeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            Self::EmployeeNotFound(_) => None,
        }
    }
}

impl From<RepoError> for EmployeeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EmployeeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for EmployeeServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Employee service facade over repository implementations.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a candidate document and persists it as a new employee.
    ///
    /// Returns the stored record carrying its generated stable ID.
    pub fn hire(&self, draft: EmployeeDraft) -> Result<Employee, EmployeeServiceError> {
        let employee = draft.into_employee()?;
        self.repo.save(&employee)?;
        Ok(employee)
    }

    /// Reassigns one employee to another department.
    pub fn transfer(
        &self,
        id: EmployeeId,
        department: impl Into<String>,
    ) -> Result<Employee, EmployeeServiceError> {
        let mut employee = self
            .repo
            .get(id)?
            .ok_or(EmployeeServiceError::EmployeeNotFound(id))?;
        employee.department = department.into();
        self.repo.save(&employee)?;
        Ok(employee)
    }

    /// Removes one employee record by stable ID.
    pub fn dismiss(&self, id: EmployeeId) -> Result<(), EmployeeServiceError> {
        self.repo.remove(id)?;
        Ok(())
    }

    /// Inserts or replaces one typed employee record.
    pub fn save_employee(&self, employee: &Employee) -> RepoResult<SaveOutcome> {
        self.repo.save(employee)
    }

    /// Returns all matching records in natural insertion order.
    pub fn find_employees(&self, filter: &EmployeeFilter) -> RepoResult<Vec<Employee>> {
        self.repo.find(filter)
    }

    /// Returns the first matching record, if any.
    pub fn find_employee(&self, filter: &EmployeeFilter) -> RepoResult<Option<Employee>> {
        self.repo.find_one(filter)
    }

    /// Gets one record by stable ID.
    pub fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.repo.get(id)
    }

    /// Applies a field-set patch to the first matching document.
    pub fn update_one(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64> {
        self.repo.update_one(filter, patch)
    }

    /// Applies a field-set patch to every matching document.
    pub fn update_many(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64> {
        self.repo.update_many(filter, patch)
    }

    /// Deletes the first matching document.
    pub fn delete_one(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        self.repo.delete_one(filter)
    }

    /// Deletes every matching document.
    pub fn delete_many(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        self.repo.delete_many(filter)
    }

    /// Counts matching documents.
    pub fn count_employees(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        self.repo.count(filter)
    }
}
