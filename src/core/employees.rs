use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, next_id};
use crate::store::Store;

pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found";

/// Admin edits to an employee. Absent fields are left untouched.
#[derive(Debug, Default, Clone)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub active: Option<bool>,
}

fn clean_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Employee name cannot be empty"));
    }
    Ok(name.to_string())
}

pub async fn list_active(store: &dyn Store) -> AppResult<Vec<Employee>> {
    Ok(store
        .employees()
        .await?
        .into_iter()
        .filter(|e| e.active)
        .collect())
}

/// Any employee by id, active or not.
pub async fn get(store: &dyn Store, id: u64) -> AppResult<Employee> {
    store
        .employees()
        .await?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))
}

#[instrument(skip(store))]
pub async fn add(store: &dyn Store, name: &str) -> AppResult<Employee> {
    let name = clean_name(name)?;
    let employees = store.employees().await?;

    let employee = Employee::new(next_id(&employees), name);
    store.append_employee(&employee).await?;

    info!(id = employee.id, "Employee added");
    Ok(employee)
}

#[instrument(skip(store))]
pub async fn update(store: &dyn Store, id: u64, changes: EmployeeChanges) -> AppResult<Employee> {
    let mut employee = get(store, id).await?;

    if changes.name.is_none() && changes.active.is_none() {
        return Err(AppError::validation("No fields provided for update"));
    }
    if let Some(name) = changes.name.as_deref() {
        employee.name = clean_name(name)?;
    }
    if let Some(active) = changes.active {
        employee.active = active;
    }

    if !store.update_employee(&employee).await? {
        return Err(AppError::not_found(EMPLOYEE_NOT_FOUND));
    }
    info!(id, active = employee.active, "Employee updated");
    Ok(employee)
}

/// Soft delete: the row stays so old attendance still resolves.
pub async fn deactivate(store: &dyn Store, id: u64) -> AppResult<Employee> {
    update(
        store,
        id,
        EmployeeChanges {
            name: None,
            active: Some(false),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[actix_web::test]
    async fn add_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let asha = add(&store, "Asha").await.unwrap();
        let ravi = add(&store, "  Ravi  ").await.unwrap();

        assert_eq!(asha, Employee::new(1, "Asha"));
        assert_eq!(ravi, Employee::new(2, "Ravi"));
    }

    #[actix_web::test]
    async fn whitespace_name_is_rejected_without_consuming_an_id() {
        let store = MemoryStore::new();
        let err = add(&store, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.employees().await.unwrap().is_empty());

        assert_eq!(add(&store, "Asha").await.unwrap().id, 1);
    }

    #[actix_web::test]
    async fn ids_continue_after_deactivated_max() {
        let store = MemoryStore::new();
        add(&store, "A").await.unwrap();
        let b = add(&store, "B").await.unwrap();
        deactivate(&store, b.id).await.unwrap();

        assert_eq!(add(&store, "C").await.unwrap().id, 3);
    }

    #[actix_web::test]
    async fn deactivate_hides_from_list_but_keeps_row() {
        let store = MemoryStore::new();
        let asha = add(&store, "Asha").await.unwrap();
        assert_eq!(list_active(&store).await.unwrap(), vec![asha.clone()]);

        let gone = deactivate(&store, asha.id).await.unwrap();
        assert!(!gone.active);
        assert!(list_active(&store).await.unwrap().is_empty());
        assert!(!get(&store, asha.id).await.unwrap().active);
    }

    #[actix_web::test]
    async fn update_renames_and_can_reactivate() {
        let store = MemoryStore::new();
        let asha = add(&store, "Asha").await.unwrap();
        deactivate(&store, asha.id).await.unwrap();

        let changed = update(
            &store,
            asha.id,
            EmployeeChanges {
                name: Some(" Asha K ".into()),
                active: Some(true),
            },
        )
        .await
        .unwrap();
        assert_eq!(changed, Employee::new(1, "Asha K"));
        assert_eq!(list_active(&store).await.unwrap(), vec![changed]);
    }

    #[actix_web::test]
    async fn update_validates_input() {
        let store = MemoryStore::new();
        add(&store, "Asha").await.unwrap();

        let empty = EmployeeChanges {
            name: Some(" ".into()),
            active: None,
        };
        assert!(matches!(
            update(&store, 1, empty).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            update(&store, 1, EmployeeChanges::default()).await,
            Err(AppError::Validation(m)) if m == "No fields provided for update"
        ));
        assert_eq!(get(&store, 1).await.unwrap().name, "Asha");
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let rename = EmployeeChanges {
            name: Some("X".into()),
            active: None,
        };
        assert!(matches!(update(&store, 9, rename).await, Err(AppError::NotFound(_))));
        assert!(matches!(deactivate(&store, 9).await, Err(AppError::NotFound(_))));
        assert!(matches!(get(&store, 9).await, Err(AppError::NotFound(_))));
    }
}
