use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "date": "2024-06-01",
        "employee_id": 1,
        "employee_name": "Asha",
        "arrival_time": "10:00",
        "kiosk_id": "kiosk-A"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = 1)]
    pub employee_id: u64,

    /// Name at the time of marking
    #[schema(example = "Asha")]
    pub employee_name: String,

    #[schema(example = "10:00")]
    pub arrival_time: String,

    #[schema(example = "kiosk-A")]
    pub kiosk_id: String,
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days_in_month(&self) -> u32 {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for YearMonth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid month '{s}', expected YYYY-MM"));

        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One employee's line in the monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatrixRow {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Asha")]
    pub name: String,
    pub active: bool,
    /// Index 0 is day 1. `null` means absent.
    #[schema(value_type = Vec<Object>)]
    pub days: Vec<Option<AttendanceRecord>>,
}

impl MatrixRow {
    pub fn present_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyMatrix {
    #[schema(example = "2024-06")]
    pub month: String,
    #[schema(example = 30)]
    pub days_in_month: u32,
    pub rows: Vec<MatrixRow>,
}

impl MonthlyMatrix {
    pub fn row(&self, employee_id: u64) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| r.id == employee_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodayCount {
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 12)]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_year_month() {
        let ym: YearMonth = "2024-06".parse().unwrap();
        assert_eq!((ym.year(), ym.month()), (2024, 6));
        assert_eq!(ym.to_string(), "2024-06");
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["", "2024", "2024-13", "2024-00", "24-06", "2024-6", "abcd-ef"] {
            assert!(
                matches!(bad.parse::<YearMonth>(), Err(AppError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        let days = |s: &str| s.parse::<YearMonth>().unwrap().days_in_month();
        assert_eq!(days("2024-02"), 29);
        assert_eq!(days("2023-02"), 28);
        assert_eq!(days("1900-02"), 28);
        assert_eq!(days("2000-02"), 29);
        assert_eq!(days("2024-04"), 30);
        assert_eq!(days("2024-12"), 31);
    }

    #[test]
    fn record_date_serializes_as_iso_day() {
        let rec = AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            employee_id: 1,
            employee_name: "Asha".into(),
            arrival_time: "10:00".into(),
            kiosk_id: "kiosk-A".into(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["date"], "2024-06-01");
        assert_eq!(v["arrival_time"], "10:00");
    }
}
