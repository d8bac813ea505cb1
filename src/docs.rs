use crate::api::attendance::MarkAttendance;
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::model::attendance::{AttendanceRecord, MatrixRow, MonthlyMatrix, TodayCount};
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Kiosk API",
        version = "0.1.0",
        description = r#"
## Attendance kiosk

Employees mark their arrival at a kiosk; admins manage the employee list and
read a monthly presence matrix.

### Response format
Every JSON response uses the envelope `{ "ok": bool, "data"?: any, "error"?: string }`.

### Errors
- **400** invalid input (empty name, malformed month, missing employee id)
- **404** unknown or inactive employee
- **409** attendance already marked for today
- **502** backing spreadsheet or database unreachable
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::monthly_matrix,
        crate::api::attendance::today
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            MarkAttendance,
            AttendanceRecord,
            MatrixRow,
            MonthlyMatrix,
            TodayCount
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance marking and reporting APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for p in [
            "/api/employees",
            "/api/employees/{employee_id}",
            "/api/attendance",
            "/api/attendance/today",
        ] {
            assert!(paths.iter().any(|k| k == p), "missing {p}");
        }
    }
}
