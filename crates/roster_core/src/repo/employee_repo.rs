//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `employees` storage.
//! - Keep SQL and filter-compilation details inside the persistence boundary.
//!
//! # Invariants
//! - Filters constrain only the fields they name; the empty filter matches
//!   every stored document.
//! - "First matching" follows natural insertion order, which `save`
//!   replacement preserves.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    uuid,
    first_name,
    last_name,
    department
FROM employees";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for employee persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EmployeeId),
    InvalidData(String),
    /// Connection schema is behind the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection schema lacks a required table.
    MissingRequiredTable(&'static str),
    /// Connection schema lacks a required column on an existing table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "employee not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted employee data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind expected version {expected_version}; apply migrations first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table is missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column is missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Exact-match filter over employee schema fields.
///
/// Each slot is optional; omitted fields do not constrain the match, so the
/// default filter selects every stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
}

impl EmployeeFilter {
    /// Returns whether this filter constrains no field at all.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.department.is_none()
    }
}

/// Field-set patch applied by the bulk update operations.
///
/// Only named fields are rewritten. Patch values are applied as provided;
/// bulk updates do not re-run schema validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
}

impl EmployeePatch {
    /// Returns whether this patch rewrites no field at all.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.department.is_none()
    }
}

/// Reported effect of an [`EmployeeRepository::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record id was unknown; a new document was inserted.
    Inserted,
    /// The record id existed; the stored document was replaced.
    Replaced,
}

/// Repository interface for employee CRUD operations.
pub trait EmployeeRepository {
    /// Inserts the record when its id is new, otherwise replaces the stored
    /// document wholesale.
    fn save(&self, employee: &Employee) -> RepoResult<SaveOutcome>;
    /// Returns all matching records in natural insertion order.
    fn find(&self, filter: &EmployeeFilter) -> RepoResult<Vec<Employee>>;
    /// Returns the first matching record, if any.
    fn find_one(&self, filter: &EmployeeFilter) -> RepoResult<Option<Employee>>;
    /// Gets one record by stable id.
    fn get(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Applies the patch to the first matching document. Returns the number
    /// of modified documents (0 or 1).
    fn update_one(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64>;
    /// Applies the patch to every matching document. Returns the number of
    /// modified documents.
    fn update_many(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64>;
    /// Deletes the first matching document. Returns the number of deleted
    /// documents (0 or 1).
    fn delete_one(&self, filter: &EmployeeFilter) -> RepoResult<u64>;
    /// Deletes every matching document. Returns the number of deleted
    /// documents.
    fn delete_many(&self, filter: &EmployeeFilter) -> RepoResult<u64>;
    /// Deletes one specific document by stable id.
    fn remove(&self, id: EmployeeId) -> RepoResult<()>;
    /// Counts matching documents.
    fn count(&self, filter: &EmployeeFilter) -> RepoResult<u64>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the employees
    ///   schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_employee_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn employee_exists(&self, id: EmployeeId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM employees
                WHERE uuid = ?1
            );",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn save(&self, employee: &Employee) -> RepoResult<SaveOutcome> {
        let existed = self.employee_exists(employee.uuid)?;

        // The upsert keeps the original rowid on replacement, so natural
        // insertion order survives repeated saves of the same record.
        self.conn.execute(
            "INSERT INTO employees (
                uuid,
                first_name,
                last_name,
                department
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(uuid) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                department = excluded.department,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                employee.uuid.to_string(),
                employee.first_name.as_str(),
                employee.last_name.as_str(),
                employee.department.as_str(),
            ],
        )?;

        Ok(if existed {
            SaveOutcome::Replaced
        } else {
            SaveOutcome::Inserted
        })
    }

    fn find(&self, filter: &EmployeeFilter) -> RepoResult<Vec<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_clauses(filter, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn find_one(&self, filter: &EmployeeFilter) -> RepoResult<Option<Employee>> {
        let mut sql = format!("{EMPLOYEE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_clauses(filter, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY rowid ASC LIMIT 1");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn get(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn update_one(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64> {
        let Some((set_sql, mut bind_values)) = build_patch_assignments(patch) else {
            return Ok(0);
        };

        // UPDATE ... LIMIT needs a non-default SQLite compile flag, so the
        // first match is pinned through an id subquery instead.
        let mut sql = format!(
            "UPDATE employees
             SET {set_sql}
             WHERE uuid IN (
                SELECT uuid
                FROM employees
                WHERE 1 = 1"
        );
        push_filter_clauses(filter, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY rowid ASC LIMIT 1);");

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed as u64)
    }

    fn update_many(&self, filter: &EmployeeFilter, patch: &EmployeePatch) -> RepoResult<u64> {
        let Some((set_sql, mut bind_values)) = build_patch_assignments(patch) else {
            return Ok(0);
        };

        let mut sql = format!("UPDATE employees SET {set_sql} WHERE 1 = 1");
        push_filter_clauses(filter, &mut sql, &mut bind_values);

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed as u64)
    }

    fn delete_one(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        let mut sql = String::from(
            "DELETE FROM employees
             WHERE uuid IN (
                SELECT uuid
                FROM employees
                WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_clauses(filter, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY rowid ASC LIMIT 1);");

        let deleted = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(deleted as u64)
    }

    fn delete_many(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        let mut sql = String::from("DELETE FROM employees WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_clauses(filter, &mut sql, &mut bind_values);

        let deleted = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(deleted as u64)
    }

    fn remove(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count(&self, filter: &EmployeeFilter) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM employees WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_clauses(filter, &mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Appends bound `AND column = ?` clauses for every constrained filter field.
fn push_filter_clauses(filter: &EmployeeFilter, sql: &mut String, bind_values: &mut Vec<Value>) {
    if let Some(first_name) = filter.first_name.as_ref() {
        sql.push_str(" AND first_name = ?");
        bind_values.push(Value::Text(first_name.clone()));
    }
    if let Some(last_name) = filter.last_name.as_ref() {
        sql.push_str(" AND last_name = ?");
        bind_values.push(Value::Text(last_name.clone()));
    }
    if let Some(department) = filter.department.as_ref() {
        sql.push_str(" AND department = ?");
        bind_values.push(Value::Text(department.clone()));
    }
}

/// Builds `SET` assignments for a patch, or `None` for the empty patch.
///
/// `updated_at` is rewritten alongside the patched fields. Bind values come
/// back in SQL text order, so filter values must be appended after.
fn build_patch_assignments(patch: &EmployeePatch) -> Option<(String, Vec<Value>)> {
    if patch.is_empty() {
        return None;
    }

    let mut assignments = Vec::new();
    let mut bind_values = Vec::new();
    if let Some(first_name) = patch.first_name.as_ref() {
        assignments.push("first_name = ?");
        bind_values.push(Value::Text(first_name.clone()));
    }
    if let Some(last_name) = patch.last_name.as_ref() {
        assignments.push("last_name = ?");
        bind_values.push(Value::Text(last_name.clone()));
    }
    if let Some(department) = patch.department.as_ref() {
        assignments.push("department = ?");
        bind_values.push(Value::Text(department.clone()));
    }
    assignments.push("updated_at = (strftime('%s', 'now') * 1000)");

    Some((assignments.join(", "), bind_values))
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text)?;

    Ok(Employee {
        uuid,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        department: row.get("department")?,
    })
}

fn parse_uuid(value: &str) -> RepoResult<EmployeeId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in employees.uuid"))
    })
}

fn ensure_employee_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "employees")? {
        return Err(RepoError::MissingRequiredTable("employees"));
    }

    for column in [
        "uuid",
        "first_name",
        "last_name",
        "department",
        "created_at",
        "updated_at",
    ] {
        if !table_has_column(conn, "employees", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "employees",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
