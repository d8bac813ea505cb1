//! Row storage for the two tables (Employees, Attendance).
//!
//! The core never talks to a spreadsheet or a database directly; it is handed
//! an `Arc<dyn Store>` and only uses these capabilities: read every row of a
//! table, append a row, and overwrite an employee row in place. There is no
//! caching here, each call reads the backing store.

use async_trait::async_trait;
use strum_macros::{Display, EnumString};

use crate::error::AppResult;
use crate::model::attendance::{AttendanceRecord, YearMonth};
use crate::model::employee::Employee;

pub mod google_auth;
pub mod memory;
pub mod mysql;
pub mod sheets;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;
pub use sheets::SheetsStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// All employees, active or not, in storage order.
    async fn employees(&self) -> AppResult<Vec<Employee>>;

    async fn append_employee(&self, employee: &Employee) -> AppResult<()>;

    /// Overwrites name and active flag of the row with `employee.id`.
    /// Returns `false` when no such row exists.
    async fn update_employee(&self, employee: &Employee) -> AppResult<bool>;

    /// All attendance records in storage order.
    async fn attendance(&self) -> AppResult<Vec<AttendanceRecord>>;

    async fn attendance_in_month(&self, month: YearMonth) -> AppResult<Vec<AttendanceRecord>> {
        Ok(self
            .attendance()
            .await?
            .into_iter()
            .filter(|r| month.contains(r.date))
            .collect())
    }

    async fn append_attendance(&self, record: &AttendanceRecord) -> AppResult<()>;
}

/// Which backend `main` wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    Sheets,
    MySql,
    Memory,
}

/// Table names as they appear in the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Table {
    Employees,
    Attendance,
}
