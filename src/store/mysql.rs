use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::{error, info};

use super::Store;
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, YearMonth};
use crate::model::employee::Employee;

const CREATE_EMPLOYEES: &str = r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGINT UNSIGNED NOT NULL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        position BIGINT UNSIGNED NOT NULL AUTO_INCREMENT UNIQUE
    )
"#;

const CREATE_ATTENDANCE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        date DATE NOT NULL,
        employee_id BIGINT UNSIGNED NOT NULL,
        employee_name VARCHAR(255) NOT NULL,
        arrival_time CHAR(5) NOT NULL,
        kiosk_id VARCHAR(64) NOT NULL,
        UNIQUE KEY uq_attendance_employee_date (employee_id, date)
    )
"#;

/// MySQL rendition of the two tables. `position` / the attendance primary key
/// keep insertion order so reads come back in storage order like a sheet.
pub struct MySqlStore {
    pool: MySqlPool,
}

pub async fn init_db(database_url: &str) -> AppResult<MySqlPool> {
    MySqlPool::connect(database_url).await.map_err(|e| {
        error!(error = %e, "Failed to connect to database");
        AppError::from(e)
    })
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_EMPLOYEES).execute(&self.pool).await?;
        sqlx::query(CREATE_ATTENDANCE).execute(&self.pool).await?;
        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn employees(&self) -> AppResult<Vec<Employee>> {
        Ok(sqlx::query_as::<_, Employee>(
            "SELECT id, name, active FROM employees ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_employee(&self, employee: &Employee) -> AppResult<()> {
        sqlx::query("INSERT INTO employees (id, name, active) VALUES (?, ?, ?)")
            .bind(employee.id)
            .bind(&employee.name)
            .bind(employee.active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> AppResult<bool> {
        // MySQL reports zero affected rows when the values are unchanged, so
        // existence is checked separately.
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
            .bind(employee.id)
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE employees SET name = ?, active = ? WHERE id = ?")
            .bind(&employee.name)
            .bind(employee.active)
            .bind(employee.id)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    async fn attendance(&self) -> AppResult<Vec<AttendanceRecord>> {
        Ok(sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT date, employee_id, employee_name, arrival_time, kiosk_id
            FROM attendance
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn attendance_in_month(&self, month: YearMonth) -> AppResult<Vec<AttendanceRecord>> {
        Ok(sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT date, employee_id, employee_name, arrival_time, kiosk_id
            FROM attendance
            WHERE YEAR(date) = ? AND MONTH(date) = ?
            ORDER BY id
            "#,
        )
        .bind(month.year())
        .bind(month.month())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_attendance(&self, record: &AttendanceRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (date, employee_id, employee_name, arrival_time, kiosk_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.date)
        .bind(record.employee_id)
        .bind(&record.employee_name)
        .bind(&record.arrival_time)
        .bind(&record.kiosk_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // Same employee and day raced past the read-side check
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        return Err(AppError::Duplicate("Already marked for today".into()));
                    }
                }
                error!(error = %e, employee_id = record.employee_id, "Attendance insert failed");
                Err(e.into())
            }
        }
    }
}
