use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::Store;
use crate::error::{AppError, AppResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;

#[derive(Debug, Default)]
struct Tables {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
}

/// Both tables held in process memory. Used for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(employees: Vec<Employee>, attendance: Vec<AttendanceRecord>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                employees,
                attendance,
            }),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::transport("In-memory store is poisoned"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn employees(&self) -> AppResult<Vec<Employee>> {
        Ok(self.lock()?.employees.clone())
    }

    async fn append_employee(&self, employee: &Employee) -> AppResult<()> {
        self.lock()?.employees.push(employee.clone());
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> AppResult<bool> {
        let mut tables = self.lock()?;
        match tables.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(row) => {
                row.name = employee.name.clone();
                row.active = employee.active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn attendance(&self) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self.lock()?.attendance.clone())
    }

    async fn append_attendance(&self, record: &AttendanceRecord) -> AppResult<()> {
        self.lock()?.attendance.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::YearMonth;
    use chrono::NaiveDate;

    fn record(date: &str, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            employee_id: id,
            employee_name: format!("E{id}"),
            arrival_time: "09:00".into(),
            kiosk_id: "reception".into(),
        }
    }

    #[actix_web::test]
    async fn update_reports_missing_rows() {
        let store = MemoryStore::with_rows(vec![Employee::new(1, "A")], vec![]);
        assert!(store.update_employee(&Employee::new(1, "B")).await.unwrap());
        assert!(!store.update_employee(&Employee::new(2, "C")).await.unwrap());
        assert_eq!(store.employees().await.unwrap()[0].name, "B");
    }

    #[actix_web::test]
    async fn month_filter_uses_calendar_month() {
        let store = MemoryStore::with_rows(
            vec![],
            vec![
                record("2024-01-31", 1),
                record("2024-02-01", 1),
                record("2024-02-29", 2),
                record("2023-02-10", 2),
            ],
        );
        let feb = store
            .attendance_in_month("2024-02".parse::<YearMonth>().unwrap())
            .await
            .unwrap();
        assert_eq!(feb.len(), 2);
        assert!(feb.iter().all(|r| r.date.to_string().starts_with("2024-02")));
    }
}
