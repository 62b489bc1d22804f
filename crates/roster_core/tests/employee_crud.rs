use roster_core::db::migrations::latest_version;
use roster_core::db::{open_db, open_db_in_memory};
use roster_core::{
    Employee, EmployeeDraft, EmployeeFilter, EmployeePatch, EmployeeRepository, EmployeeService,
    EmployeeServiceError, RepoError, SaveOutcome, SqliteEmployeeRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn find_returns_all_inserted_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let employees = repo.find(&EmployeeFilter::default()).unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0].first_name, "Jan");
    assert_eq!(employees[1].first_name, "Tadeusz");
}

#[test]
fn find_one_returns_document_matching_full_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let employee = repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    assert_eq!(employee.first_name, "Jan");
    assert_eq!(employee.last_name, "Kowalski");
    assert_eq!(employee.department, "IT");

    let mismatch = repo.find_one(&filter_for("Jan", "Nowak", "IT")).unwrap();
    assert!(mismatch.is_none());
}

#[test]
fn save_inserts_new_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let jan = Employee::new("Jan", "Kowalski", "IT");
    assert_eq!(repo.save(&jan).unwrap(), SaveOutcome::Inserted);

    let loaded = repo.get(jan.uuid).unwrap().unwrap();
    assert_eq!(loaded, jan);
    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 1);
}

#[test]
fn save_replaces_existing_document_wholesale() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let mut jan = Employee::new("Jan", "Kowalski", "IT");
    assert_eq!(repo.save(&jan).unwrap(), SaveOutcome::Inserted);

    jan.first_name = "=Jan=".to_string();
    jan.last_name = "=Kowalski=".to_string();
    jan.department = "=IT=".to_string();
    assert_eq!(repo.save(&jan).unwrap(), SaveOutcome::Replaced);

    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 1);
    let loaded = repo.get(jan.uuid).unwrap().unwrap();
    assert_eq!(loaded.first_name, "=Jan=");
    assert_eq!(loaded.last_name, "=Kowalski=");
    assert_eq!(loaded.department, "=IT=");
}

#[test]
fn update_one_rewrites_first_matching_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let modified = repo
        .update_one(
            &filter_for("Jan", "Kowalski", "IT"),
            &patch_for("=Jan=", "=Kowalski=", "=IT="),
        )
        .unwrap();
    assert_eq!(modified, 1);

    assert!(repo
        .find_one(&filter_for("=Jan=", "=Kowalski=", "=IT="))
        .unwrap()
        .is_some());
    assert!(repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .is_none());
    assert!(repo
        .find_one(&filter_for("Tadeusz", "Nowak", "Managment"))
        .unwrap()
        .is_some());
}

#[test]
fn update_one_touches_only_the_first_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let (jan, tadeusz) = seed_directory(&repo);

    let patch = EmployeePatch {
        department: Some("Archive".to_string()),
        ..EmployeePatch::default()
    };
    let modified = repo.update_one(&EmployeeFilter::default(), &patch).unwrap();
    assert_eq!(modified, 1);

    let first = repo.get(jan.uuid).unwrap().unwrap();
    assert_eq!(first.department, "Archive");
    assert_eq!(first.first_name, "Jan");
    assert_eq!(first.last_name, "Kowalski");
    assert_eq!(repo.get(tadeusz.uuid).unwrap().unwrap().department, "Managment");
}

#[test]
fn fetched_record_mutates_and_saves_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let mut employee = repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    employee.first_name = "=Jan=".to_string();
    employee.last_name = "=Kowalski=".to_string();
    employee.department = "=IT=".to_string();
    assert_eq!(repo.save(&employee).unwrap(), SaveOutcome::Replaced);

    assert!(repo
        .find_one(&filter_for("=Jan=", "=Kowalski=", "=IT="))
        .unwrap()
        .is_some());
    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 2);
}

#[test]
fn update_many_rewrites_every_matching_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let modified = repo
        .update_many(
            &EmployeeFilter::default(),
            &patch_for("Updated!", "Updated!", "Updated!"),
        )
        .unwrap();
    assert_eq!(modified, 2);

    let employees = repo
        .find(&filter_for("Updated!", "Updated!", "Updated!"))
        .unwrap();
    assert_eq!(employees.len(), 2);
}

#[test]
fn update_many_only_touches_matching_documents() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let it_filter = EmployeeFilter {
        department: Some("IT".to_string()),
        ..EmployeeFilter::default()
    };
    let patch = EmployeePatch {
        department: Some("Support".to_string()),
        ..EmployeePatch::default()
    };
    assert_eq!(repo.update_many(&it_filter, &patch).unwrap(), 1);

    assert!(repo
        .find_one(&filter_for("Jan", "Kowalski", "Support"))
        .unwrap()
        .is_some());
    assert!(repo
        .find_one(&filter_for("Tadeusz", "Nowak", "Managment"))
        .unwrap()
        .is_some());
}

#[test]
fn update_with_empty_patch_modifies_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let modified_one = repo
        .update_one(&filter_for("Jan", "Kowalski", "IT"), &EmployeePatch::default())
        .unwrap();
    assert_eq!(modified_one, 0);

    let modified_many = repo
        .update_many(&EmployeeFilter::default(), &EmployeePatch::default())
        .unwrap();
    assert_eq!(modified_many, 0);

    assert!(repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .is_some());
}

#[test]
fn delete_one_removes_first_matching_document() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let deleted = repo.delete_one(&filter_for("Jan", "Kowalski", "IT")).unwrap();
    assert_eq!(deleted, 1);

    assert!(repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .is_none());
    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 1);
}

#[test]
fn delete_one_without_match_reports_zero() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let deleted = repo.delete_one(&filter_for("Jan", "Kowalski", "IT")).unwrap();
    assert_eq!(deleted, 0);
}

#[test]
fn remove_deletes_document_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let employee = repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    repo.remove(employee.uuid).unwrap();

    assert!(repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .is_none());
    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 1);
}

#[test]
fn remove_missing_document_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo.remove(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_many_with_empty_filter_clears_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    let deleted = repo.delete_many(&EmployeeFilter::default()).unwrap();
    assert_eq!(deleted, 2);
    assert!(repo.find(&EmployeeFilter::default()).unwrap().is_empty());
}

#[test]
fn delete_many_honors_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let (_, tadeusz) = seed_directory(&repo);
    let anna = Employee::new("Anna", "Nowak", "IT");
    repo.save(&anna).unwrap();

    let it_filter = EmployeeFilter {
        department: Some("IT".to_string()),
        ..EmployeeFilter::default()
    };
    assert_eq!(repo.delete_many(&it_filter).unwrap(), 2);

    let remaining = repo.find(&EmployeeFilter::default()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].uuid, tadeusz.uuid);
}

#[test]
fn partial_filters_constrain_only_named_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);
    let anna = Employee::new("Anna", "Nowak", "IT");
    repo.save(&anna).unwrap();

    let it_only = EmployeeFilter {
        department: Some("IT".to_string()),
        ..EmployeeFilter::default()
    };
    assert_eq!(repo.find(&it_only).unwrap().len(), 2);

    let nowak_only = EmployeeFilter {
        last_name: Some("Nowak".to_string()),
        ..EmployeeFilter::default()
    };
    assert_eq!(repo.find(&nowak_only).unwrap().len(), 2);

    let nowak_it = EmployeeFilter {
        last_name: Some("Nowak".to_string()),
        department: Some("IT".to_string()),
        ..EmployeeFilter::default()
    };
    let matched = repo.find(&nowak_it).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].uuid, anna.uuid);
}

#[test]
fn count_reflects_filter_constraints() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    seed_directory(&repo);

    assert_eq!(repo.count(&EmployeeFilter::default()).unwrap(), 2);

    let it_only = EmployeeFilter {
        department: Some("IT".to_string()),
        ..EmployeeFilter::default()
    };
    assert_eq!(repo.count(&it_only).unwrap(), 1);
    assert_eq!(repo.count(&filter_for("Jan", "Nowak", "IT")).unwrap(), 0);
}

#[test]
fn natural_order_is_stable_across_replacement() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let (jan, tadeusz) = seed_directory(&repo);

    let mut first = repo.get(jan.uuid).unwrap().unwrap();
    first.department = "Platform".to_string();
    assert_eq!(repo.save(&first).unwrap(), SaveOutcome::Replaced);

    let all = repo.find(&EmployeeFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].uuid, jan.uuid);
    assert_eq!(all[1].uuid, tadeusz.uuid);
}

#[test]
fn find_one_picks_first_inserted_among_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let first = Employee::new("Jan", "Kowalski", "IT");
    let second = Employee::new("Jan", "Kowalski", "IT");
    repo.save(&first).unwrap();
    repo.save(&second).unwrap();

    let found = repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    assert_eq!(found.uuid, first.uuid);
}

#[test]
fn records_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");
    let jan = Employee::new("Jan", "Kowalski", "IT");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        repo.save(&jan).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let loaded = repo
        .find_one(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    assert_eq!(loaded.uuid, jan.uuid);
}

#[test]
fn service_hire_validates_before_persisting() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let err = service.hire(EmployeeDraft::default()).unwrap_err();
    match err {
        EmployeeServiceError::Validation(errors) => assert_eq!(errors.len(), 3),
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(service.count_employees(&EmployeeFilter::default()).unwrap(), 0);
}

#[test]
fn service_hire_persists_valid_draft() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let hired = service
        .hire(EmployeeDraft::new("Jan", "Kowalski", "IT"))
        .unwrap();

    let loaded = service.get_employee(hired.uuid).unwrap().unwrap();
    assert_eq!(loaded, hired);
}

#[test]
fn service_transfer_moves_employee_to_new_department() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let hired = service
        .hire(EmployeeDraft::new("Jan", "Kowalski", "IT"))
        .unwrap();
    let transferred = service.transfer(hired.uuid, "Support").unwrap();
    assert_eq!(transferred.department, "Support");

    let loaded = service.get_employee(hired.uuid).unwrap().unwrap();
    assert_eq!(loaded.department, "Support");
    assert_eq!(loaded.first_name, "Jan");
}

#[test]
fn service_transfer_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let missing = Uuid::new_v4();
    let err = service.transfer(missing, "Support").unwrap_err();
    assert!(matches!(err, EmployeeServiceError::EmployeeNotFound(id) if id == missing));
}

#[test]
fn service_dismiss_removes_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let hired = service
        .hire(EmployeeDraft::new("Jan", "Kowalski", "IT"))
        .unwrap();
    service.dismiss(hired.uuid).unwrap();
    assert!(service.get_employee(hired.uuid).unwrap().is_none());

    let err = service.dismiss(hired.uuid).unwrap_err();
    assert!(matches!(err, EmployeeServiceError::EmployeeNotFound(id) if id == hired.uuid));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let service = EmployeeService::new(repo);

    let jan = Employee::new("Jan", "Kowalski", "IT");
    let tadeusz = Employee::new("Tadeusz", "Nowak", "Managment");
    assert_eq!(service.save_employee(&jan).unwrap(), SaveOutcome::Inserted);
    assert_eq!(service.save_employee(&tadeusz).unwrap(), SaveOutcome::Inserted);

    let all = service.find_employees(&EmployeeFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    let found = service
        .find_employee(&filter_for("Jan", "Kowalski", "IT"))
        .unwrap()
        .unwrap();
    assert_eq!(found.uuid, jan.uuid);

    let modified = service
        .update_one(
            &filter_for("Jan", "Kowalski", "IT"),
            &patch_for("=Jan=", "=Kowalski=", "=IT="),
        )
        .unwrap();
    assert_eq!(modified, 1);
    assert_eq!(
        service
            .delete_one(&filter_for("=Jan=", "=Kowalski=", "=IT="))
            .unwrap(),
        1
    );

    let renamed = service
        .update_many(
            &EmployeeFilter::default(),
            &patch_for("Updated!", "Updated!", "Updated!"),
        )
        .unwrap();
    assert_eq!(renamed, 1);
    assert_eq!(service.delete_many(&EmployeeFilter::default()).unwrap(), 1);
    assert_eq!(service.count_employees(&EmployeeFilter::default()).unwrap(), 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteEmployeeRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_employees_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEmployeeRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("employees"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_employees_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE employees (
            uuid TEXT PRIMARY KEY NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEmployeeRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "employees",
            column: "department"
        })
    ));
}

fn seed_directory(repo: &SqliteEmployeeRepository<'_>) -> (Employee, Employee) {
    let jan = Employee::new("Jan", "Kowalski", "IT");
    let tadeusz = Employee::new("Tadeusz", "Nowak", "Managment");
    repo.save(&jan).unwrap();
    repo.save(&tadeusz).unwrap();
    (jan, tadeusz)
}

fn filter_for(first_name: &str, last_name: &str, department: &str) -> EmployeeFilter {
    EmployeeFilter {
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        department: Some(department.to_string()),
    }
}

fn patch_for(first_name: &str, last_name: &str, department: &str) -> EmployeePatch {
    EmployeePatch {
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        department: Some(department.to_string()),
    }
}
