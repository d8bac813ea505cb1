//! Google Sheets v4 backend.
//!
//! Each table is a tab of one spreadsheet. Row 1 is a header row; columns are
//! located by header name so the admin may reorder them. Reads fetch the whole
//! tab, appends use `values:append`, updates use `values:batchUpdate` on the
//! exact cells of the employee row.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::Store;
use super::Table;
use super::google_auth::TokenProvider;
use crate::error::{AppError, AppResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

const EMPLOYEE_HEADERS: [&str; 3] = ["id", "name", "active"];
const ATTENDANCE_HEADERS: [&str; 5] = [
    "date",
    "employee_id",
    "employee_name",
    "arrival_time",
    "kiosk_id",
];

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_text_rows(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

/// A1 column letters for a zero-based index (0 → A, 26 → AA).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn find_column(header: &[String], table: Table, names: &[&str]) -> AppResult<usize> {
    header
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        .ok_or_else(|| {
            AppError::transport(format!(
                "{table} sheet is missing the '{}' column",
                names[0]
            ))
        })
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Places values at their header positions, blank-filling the gaps.
fn place(cells: &[(usize, Value)]) -> Vec<Value> {
    let width = cells.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut row = vec![Value::String(String::new()); width];
    for (i, v) in cells {
        row[*i] = v.clone();
    }
    row
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeLayout {
    pub id: usize,
    pub name: usize,
    pub active: usize,
}

impl EmployeeLayout {
    pub fn from_header(header: &[String]) -> AppResult<Self> {
        Ok(Self {
            id: find_column(header, Table::Employees, &["id"])?,
            name: find_column(header, Table::Employees, &["name"])?,
            active: find_column(header, Table::Employees, &["active"])?,
        })
    }

    pub fn row(&self, e: &Employee) -> Vec<Value> {
        place(&[
            (self.id, json!(e.id)),
            (self.name, json!(e.name)),
            (self.active, json!(e.active)),
        ])
    }

    fn parse(&self, row_number: usize, row: &[String]) -> Option<Employee> {
        let raw_id = cell(row, self.id);
        let Ok(id) = raw_id.parse::<u64>() else {
            if !raw_id.is_empty() || row.iter().any(|c| !c.is_empty()) {
                warn!(row = row_number, id = raw_id, "Skipping employee row with invalid id");
            }
            return None;
        };
        Some(Employee {
            id,
            name: cell(row, self.name).to_string(),
            active: cell(row, self.active).eq_ignore_ascii_case("TRUE"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceLayout {
    pub date: usize,
    pub employee_id: usize,
    pub employee_name: usize,
    pub arrival_time: usize,
    pub kiosk_id: usize,
}

impl AttendanceLayout {
    pub fn from_header(header: &[String]) -> AppResult<Self> {
        let t = Table::Attendance;
        Ok(Self {
            date: find_column(header, t, &["date"])?,
            employee_id: find_column(header, t, &["employee_id"])?,
            employee_name: find_column(header, t, &["employee_name", "name"])?,
            arrival_time: find_column(header, t, &["arrival_time"])?,
            kiosk_id: find_column(header, t, &["kiosk_id", "location"])?,
        })
    }

    pub fn row(&self, r: &AttendanceRecord) -> Vec<Value> {
        place(&[
            (self.date, json!(r.date.format("%Y-%m-%d").to_string())),
            (self.employee_id, json!(r.employee_id)),
            (self.employee_name, json!(r.employee_name)),
            (self.arrival_time, json!(r.arrival_time)),
            (self.kiosk_id, json!(r.kiosk_id)),
        ])
    }

    fn parse(&self, row_number: usize, row: &[String]) -> Option<AttendanceRecord> {
        if row.iter().all(|c| c.is_empty()) {
            return None;
        }
        let date = match NaiveDate::parse_from_str(cell(row, self.date), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                warn!(row = row_number, date = cell(row, self.date), "Skipping attendance row with invalid date");
                return None;
            }
        };
        let employee_id = match cell(row, self.employee_id).parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                warn!(row = row_number, employee_id = cell(row, self.employee_id), "Skipping attendance row with invalid employee id");
                return None;
            }
        };
        Some(AttendanceRecord {
            date,
            employee_id,
            employee_name: cell(row, self.employee_name).to_string(),
            arrival_time: cell(row, self.arrival_time).to_string(),
            kiosk_id: cell(row, self.kiosk_id).to_string(),
        })
    }
}

/// Employees with their 1-based sheet row numbers. An empty tab yields no rows.
pub fn parse_employees(rows: &[Vec<String>]) -> AppResult<Vec<(usize, Employee)>> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let layout = EmployeeLayout::from_header(header)?;
    Ok(data
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let row_number = i + 2;
            layout.parse(row_number, row).map(|e| (row_number, e))
        })
        .collect())
}

pub fn parse_attendance(rows: &[Vec<String>]) -> AppResult<Vec<AttendanceRecord>> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let layout = AttendanceLayout::from_header(header)?;
    Ok(data
        .iter()
        .enumerate()
        .filter_map(|(i, row)| layout.parse(i + 2, row))
        .collect())
}

pub struct SheetsStore {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    tokens: TokenProvider,
}

impl SheetsStore {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        tokens: TokenProvider,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        }
    }

    /// Writes the header row into any tab whose first row is empty, so a
    /// fresh spreadsheet is usable without manual setup.
    pub async fn ensure_headers(&self) -> AppResult<()> {
        for (table, headers) in [
            (Table::Employees, &EMPLOYEE_HEADERS[..]),
            (Table::Attendance, &ATTENDANCE_HEADERS[..]),
        ] {
            if self.header(table).await?.is_empty() {
                info!(%table, "Writing header row");
                let body = json!({
                    "range": format!("{table}!A1"),
                    "majorDimension": "ROWS",
                    "values": [headers],
                });
                self.send(
                    Method::PUT,
                    &format!("values/{table}!A1?valueInputOption=RAW"),
                    Some(body),
                )
                .await?;
            }
        }
        info!(
            spreadsheet_id = %self.spreadsheet_id,
            client_email = %self.tokens.client_email(),
            "Spreadsheet ready"
        );
        Ok(())
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> AppResult<Value> {
        let url = format!(
            "{}/spreadsheets/{}/{}",
            self.api_base, self.spreadsheet_id, path
        );
        let token = self.tokens.access_token().await?;

        debug!(%method, url = %url, "Sheets request");
        let mut req = self.http.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            error!(%status, url = %url, message = %message, "Sheets request failed");
            return Err(AppError::transport(format!(
                "Spreadsheet request failed ({status}): {message}"
            )));
        }
        Ok(resp.json().await?)
    }

    async fn read(&self, range: &str) -> AppResult<Vec<Vec<String>>> {
        let value = self
            .send(Method::GET, &format!("values/{range}"), None)
            .await?;
        let range: ValueRange = serde_json::from_value(value)
            .map_err(|e| AppError::transport(format!("Unexpected spreadsheet response: {e}")))?;
        Ok(to_text_rows(range.values))
    }

    async fn header(&self, table: Table) -> AppResult<Vec<String>> {
        Ok(self
            .read(&format!("{table}!1:1"))
            .await?
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    async fn append(&self, table: Table, row: Vec<Value>) -> AppResult<()> {
        let body = json!({ "majorDimension": "ROWS", "values": [row] });
        self.send(
            Method::POST,
            &format!("values/{table}!A1:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"),
            Some(body),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SheetsStore {
    async fn employees(&self) -> AppResult<Vec<Employee>> {
        let rows = self.read(&Table::Employees.to_string()).await?;
        Ok(parse_employees(&rows)?.into_iter().map(|(_, e)| e).collect())
    }

    async fn append_employee(&self, employee: &Employee) -> AppResult<()> {
        let layout = EmployeeLayout::from_header(&self.header(Table::Employees).await?)?;
        self.append(Table::Employees, layout.row(employee)).await
    }

    async fn update_employee(&self, employee: &Employee) -> AppResult<bool> {
        let rows = self.read(&Table::Employees.to_string()).await?;
        let Some(header) = rows.first() else {
            return Ok(false);
        };
        let layout = EmployeeLayout::from_header(header)?;
        let Some((row_number, _)) = parse_employees(&rows)?
            .into_iter()
            .find(|(_, e)| e.id == employee.id)
        else {
            return Ok(false);
        };

        let table = Table::Employees;
        let body = json!({
            "valueInputOption": "RAW",
            "data": [
                {
                    "range": format!("{table}!{}{row_number}", column_letter(layout.name)),
                    "values": [[employee.name]],
                },
                {
                    "range": format!("{table}!{}{row_number}", column_letter(layout.active)),
                    "values": [[employee.active]],
                },
            ],
        });
        self.send(Method::POST, "values:batchUpdate", Some(body))
            .await?;
        Ok(true)
    }

    async fn attendance(&self) -> AppResult<Vec<AttendanceRecord>> {
        let rows = self.read(&Table::Attendance.to_string()).await?;
        parse_attendance(&rows)
    }

    async fn append_attendance(&self, record: &AttendanceRecord) -> AppResult<()> {
        let layout = AttendanceLayout::from_header(&self.header(Table::Attendance).await?)?;
        self.append(Table::Attendance, layout.row(record)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn parses_employees_with_row_numbers() {
        let sheet = rows(&[
            &["id", "name", "active"],
            &["1", "John Doe", "TRUE"],
            &["2", "Jane Smith", "true"],
            &["3", "Bob Wilson", "FALSE"],
            &["x", "Broken", "TRUE"],
            &["11", "Test Employee"],
        ]);
        let parsed = parse_employees(&sheet).unwrap();
        let ids: Vec<_> = parsed.iter().map(|(row, e)| (*row, e.id, e.active)).collect();
        assert_eq!(
            ids,
            vec![(2, 1, true), (3, 2, true), (4, 3, false), (6, 11, false)]
        );
    }

    #[test]
    fn header_order_is_respected() {
        let sheet = rows(&[&["active", "id", "name"], &["TRUE", "4", "Alice Brown"]]);
        let parsed = parse_employees(&sheet).unwrap();
        assert_eq!(parsed[0].1, Employee::new(4, "Alice Brown"));

        let layout = EmployeeLayout::from_header(&sheet[0]).unwrap();
        assert_eq!(
            layout.row(&Employee::new(5, "Eve")),
            vec![json!(true), json!(5), json!("Eve")]
        );
    }

    #[test]
    fn missing_column_is_a_store_error() {
        let sheet = rows(&[&["id", "name"], &["1", "A"]]);
        let err = parse_employees(&sheet).unwrap_err();
        assert!(matches!(err, AppError::Transport(m) if m.contains("'active'")));
    }

    #[test]
    fn empty_tab_has_no_rows() {
        assert!(parse_employees(&[]).unwrap().is_empty());
        assert!(parse_attendance(&[]).unwrap().is_empty());
    }

    #[test]
    fn attendance_accepts_legacy_headers() {
        let sheet = rows(&[
            &["date", "employee_id", "name", "arrival_time", "location", "logout_time"],
            &["2024-01-15", "1", "John Doe", "09:00", "reception", ""],
            &["15/01/2024", "2", "Jane Smith", "09:30", "reception", "17:30"],
            &["2024-01-16", "1", "John Doe", "08:45", "reception", "18:00"],
            &[],
        ]);
        let parsed = parse_attendance(&sheet).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].employee_name, "John Doe");
        assert_eq!(parsed[0].kiosk_id, "reception");
        assert_eq!(parsed[1].arrival_time, "08:45");
    }

    #[test]
    fn attendance_row_is_placed_by_header() {
        let header = rows(&[&["employee_id", "date", "kiosk_id", "arrival_time", "employee_name"]]);
        let layout = AttendanceLayout::from_header(&header[0]).unwrap();
        let rec = AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            employee_id: 1,
            employee_name: "Asha".into(),
            arrival_time: "10:00".into(),
            kiosk_id: "kiosk-A".into(),
        };
        assert_eq!(
            layout.row(&rec),
            vec![json!(1), json!("2024-06-01"), json!("kiosk-A"), json!("10:00"), json!("Asha")]
        );
    }

    #[test]
    fn numeric_cells_become_text() {
        let rows = to_text_rows(vec![vec![json!(7), json!(" Asha "), Value::Null, json!(true)]]);
        assert_eq!(rows[0], vec!["7", "Asha", "", "true"]);
    }
}
