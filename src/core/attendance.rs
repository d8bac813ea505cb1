use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use tracing::{info, instrument, warn};

use super::employees::EMPLOYEE_NOT_FOUND;
use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, MatrixRow, MonthlyMatrix, TodayCount, YearMonth};
use crate::model::employee::Employee;
use crate::store::Store;

pub const ALREADY_MARKED: &str = "Already marked for today";

/// Records arrival for an active employee. One record per employee per day
/// (in the clock's timezone); a second attempt is a `Duplicate`.
#[instrument(skip(store, clock))]
pub async fn mark_attendance(
    store: &dyn Store,
    clock: &dyn Clock,
    employee_id: u64,
    kiosk_id: &str,
) -> AppResult<AttendanceRecord> {
    let employee = store
        .employees()
        .await?
        .into_iter()
        .find(|e| e.id == employee_id && e.active)
        .ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))?;

    let now = clock.now();
    let today = now.date_naive();

    let already = store
        .attendance_in_month(YearMonth::of(today))
        .await?
        .iter()
        .any(|r| r.date == today && r.employee_id == employee_id);
    if already {
        info!(employee_id, %today, "Attendance already marked");
        return Err(AppError::Duplicate(ALREADY_MARKED.into()));
    }

    let record = AttendanceRecord {
        date: today,
        employee_id,
        employee_name: employee.name,
        arrival_time: now.format("%H:%M").to_string(),
        kiosk_id: kiosk_id.to_string(),
    };
    store.append_attendance(&record).await?;

    info!(employee_id, %today, arrival_time = %record.arrival_time, "Attendance marked");
    Ok(record)
}

/// Presence grid for one month.
///
/// Rows are every active employee in storage order, followed by any other id
/// (deactivated, or unknown to the Employees table) that has a record in the
/// month, in order of first appearance. Deactivated employees keep their
/// Employees-table name; unknown ids fall back to the name on their latest
/// record. When two records share an employee and day the earlier one wins.
#[instrument(skip(store))]
pub async fn monthly_matrix(store: &dyn Store, month: YearMonth) -> AppResult<MonthlyMatrix> {
    let (employees, records) =
        futures::try_join!(store.employees(), store.attendance_in_month(month))?;

    Ok(build_matrix(month, &employees, records))
}

pub fn build_matrix(
    month: YearMonth,
    employees: &[Employee],
    records: Vec<AttendanceRecord>,
) -> MonthlyMatrix {
    let days = month.days_in_month() as usize;
    let known: HashMap<u64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();

    let mut rows: Vec<MatrixRow> = employees
        .iter()
        .filter(|e| e.active)
        .map(|e| MatrixRow {
            id: e.id,
            name: e.name.clone(),
            active: true,
            days: vec![None; days],
        })
        .collect();
    let mut index: HashMap<u64, usize> = rows.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let mut unknown: HashSet<u64> = HashSet::new();

    for record in records.into_iter().filter(|r| month.contains(r.date)) {
        let i = *index.entry(record.employee_id).or_insert_with(|| {
            let row = match known.get(&record.employee_id) {
                Some(e) => MatrixRow {
                    id: e.id,
                    name: e.name.clone(),
                    active: e.active,
                    days: vec![None; days],
                },
                None => {
                    warn!(employee_id = record.employee_id, "Attendance for unknown employee");
                    unknown.insert(record.employee_id);
                    MatrixRow {
                        id: record.employee_id,
                        name: record.employee_name.clone(),
                        active: false,
                        days: vec![None; days],
                    }
                }
            };
            rows.push(row);
            rows.len() - 1
        });

        let row = &mut rows[i];
        if unknown.contains(&record.employee_id) {
            row.name = record.employee_name.clone();
        }
        let slot = &mut row.days[record.date.day0() as usize];
        if slot.is_none() {
            *slot = Some(record);
        }
    }

    MonthlyMatrix {
        month: month.to_string(),
        days_in_month: days as u32,
        rows,
    }
}

/// Number of records dated today.
pub async fn today_count(store: &dyn Store, clock: &dyn Clock) -> AppResult<TodayCount> {
    let today = clock.today();
    let count = store
        .attendance_in_month(YearMonth::of(today))
        .await?
        .iter()
        .filter(|r| r.date == today)
        .count();
    Ok(TodayCount { date: today, count })
}
