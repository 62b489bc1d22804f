//! Employee record and schema validation.
//!
//! # Responsibility
//! - Define the canonical employee record persisted by the directory.
//! - Validate untyped candidate documents against the employee schema.
//!
//! # Invariants
//! - `uuid` is stable for the lifetime of a record and never reused.
//! - `first_name`, `last_name` and `department` are text on every typed
//!   record.
//! - Validation inspects all fields in one pass and reports every violation,
//!   keyed by wire field name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Wire name of the first-name field.
pub const FIELD_FIRST_NAME: &str = "firstName";
/// Wire name of the last-name field.
pub const FIELD_LAST_NAME: &str = "lastName";
/// Wire name of the department field.
pub const FIELD_DEPARTMENT: &str = "department";

/// Stable identifier of an employee record.
pub type EmployeeId = Uuid;

/// Canonical employee record.
///
/// Serialized field names follow the camelCase wire form used by stored
/// documents, so `first_name` travels as `firstName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Stable global ID used for targeted updates and deletes.
    pub uuid: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
}

impl Employee {
    /// Creates an employee record with a freshly generated stable ID.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), first_name, last_name, department)
    }

    /// Creates an employee record with a caller-provided stable ID.
    ///
    /// Read paths use this when identity already exists in storage.
    pub fn with_id(
        uuid: EmployeeId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            first_name: first_name.into(),
            last_name: last_name.into(),
            department: department.into(),
        }
    }
}

/// JSON value category reported on schema type mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    Array,
    Object,
}

impl ValueKind {
    /// Categorizes one JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::Text,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Stable lowercase label used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::Text => "text",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Schema violation recorded for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Field is absent or explicitly `null`.
    Required,
    /// Field is present but holds a non-text value.
    NotText { found: ValueKind },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::NotText { found } => write!(f, "must be text, found {}", found.as_str()),
        }
    }
}

/// Complete set of schema violations for one candidate document.
///
/// Entries are keyed by wire field name (`firstName`, `lastName`,
/// `department`) so callers can look up the failure of a specific field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, FieldError>,
}

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// Returns the violation recorded for one wire field name, if any.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    /// Returns whether no field is in violation.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields in violation.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates `(wire field name, violation)` pairs in stable field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "employee validation failed:")?;
        let mut first = true;
        for (field, error) in &self.errors {
            let separator = if first { " " } else { ", " };
            write!(f, "{separator}{field} {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Untyped candidate document for the employee schema.
///
/// Every slot is optional and loosely typed, so absence, `null` and
/// wrong-typed values survive deserialization and surface through
/// [`EmployeeDraft::validate`] instead of failing at the decoding boundary.
/// Unknown document keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Value>,
}

impl EmployeeDraft {
    /// Creates a draft whose three schema fields hold text values.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(Value::String(first_name.into())),
            last_name: Some(Value::String(last_name.into())),
            department: Some(Value::String(department.into())),
        }
    }

    /// Validates this draft against the employee schema.
    ///
    /// # Contract
    /// - A field is in violation when absent, `null`, or holding a non-text
    ///   value; empty objects and arrays count as non-text.
    /// - Empty strings are text and pass.
    /// - All violations are reported together; a valid draft yields `Ok(())`.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let fields = [
            (FIELD_FIRST_NAME, self.first_name.as_ref()),
            (FIELD_LAST_NAME, self.last_name.as_ref()),
            (FIELD_DEPARTMENT, self.department.as_ref()),
        ];
        for (field, value) in fields {
            if let Some(error) = classify_text_field(value) {
                errors.insert(field, error);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Converts this draft into a typed [`Employee`] with a fresh stable ID.
    ///
    /// # Errors
    /// - [`ValidationErrors`] listing every field in violation.
    pub fn into_employee(self) -> Result<Employee, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let first_name = take_text_field(FIELD_FIRST_NAME, self.first_name, &mut errors);
        let last_name = take_text_field(FIELD_LAST_NAME, self.last_name, &mut errors);
        let department = take_text_field(FIELD_DEPARTMENT, self.department, &mut errors);
        match (first_name, last_name, department) {
            (Some(first_name), Some(last_name), Some(department)) => {
                Ok(Employee::new(first_name, last_name, department))
            }
            _ => Err(errors),
        }
    }
}

fn classify_text_field(value: Option<&Value>) -> Option<FieldError> {
    match value {
        None | Some(Value::Null) => Some(FieldError::Required),
        Some(Value::String(_)) => None,
        Some(other) => Some(FieldError::NotText {
            found: ValueKind::of(other),
        }),
    }
}

fn take_text_field(
    field: &'static str,
    value: Option<Value>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text),
        None | Some(Value::Null) => {
            errors.insert(field, FieldError::Required);
            None
        }
        Some(other) => {
            errors.insert(
                field,
                FieldError::NotText {
                    found: ValueKind::of(&other),
                },
            );
            None
        }
    }
}
