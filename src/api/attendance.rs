use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::core::attendance;
use crate::error::AppError;
use crate::model::attendance::YearMonth;
use crate::models::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct MarkAttendance {
    /// Number or numeric string
    #[schema(example = 1, value_type = u64)]
    pub employee_id: Option<Value>,
    #[schema(example = "kiosk-A")]
    pub kiosk_id: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Month as `YYYY-MM`
    pub month: Option<String>,
}

/// Kiosks send the id either as a JSON number or as the text of a select box.
pub fn parse_employee_id(raw: Option<&Value>) -> Result<u64, AppError> {
    let invalid = || AppError::validation("employee_id must be a positive integer");
    match raw {
        None | Some(Value::Null) => Err(AppError::validation("employee_id is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(AppError::validation("employee_id is required"))
        }
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

/// Mark attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Missing or malformed employee_id"),
        (status = 404, description = "Employee unknown or inactive", body = Object, example = json!({
            "ok": false,
            "error": "Employee not found"
        })),
        (status = 409, description = "Already marked today", body = Object, example = json!({
            "ok": false,
            "error": "Already marked for today"
        })),
        (status = 429, description = "Too many requests from this kiosk")
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    state: web::Data<AppState>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_employee_id(payload.employee_id.as_ref())?;
    let kiosk_id = payload
        .kiosk_id
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(state.default_kiosk_id.as_str());

    let record = attendance::mark_attendance(
        state.store.as_ref(),
        state.clock.as_ref(),
        employee_id,
        kiosk_id,
    )
    .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(record)))
}

/// Monthly attendance matrix
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(MonthQuery),
    responses(
        (status = 200, description = "Per-employee, per-day presence", body = crate::model::attendance::MonthlyMatrix),
        (status = 400, description = "Missing or invalid month")
    ),
    tag = "Attendance"
)]
pub async fn monthly_matrix(
    state: web::Data<AppState>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    let month: YearMonth = query
        .month
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::validation("month parameter is required"))?
        .parse()?;

    let matrix = attendance::monthly_matrix(state.store.as_ref(), month).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(matrix)))
}

/// Today's attendance count
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Records dated today", body = crate::model::attendance::TodayCount)
    ),
    tag = "Attendance"
)]
pub async fn today(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let count = attendance::today_count(state.store.as_ref(), state.clock.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_employee_id(Some(&json!(7))).unwrap(), 7);
        assert_eq!(parse_employee_id(Some(&json!(" 11 "))).unwrap(), 11);
    }

    #[test]
    fn employee_id_rejections() {
        let msg = |v: Option<&Value>| parse_employee_id(v).unwrap_err().to_string();
        assert_eq!(msg(None), "employee_id is required");
        assert_eq!(msg(Some(&Value::Null)), "employee_id is required");
        assert_eq!(msg(Some(&json!(""))), "employee_id is required");
        assert_eq!(msg(Some(&json!(-3))), "employee_id must be a positive integer");
        assert_eq!(msg(Some(&json!(1.5))), "employee_id must be a positive integer");
        assert_eq!(msg(Some(&json!("abc"))), "employee_id must be a positive integer");
        assert_eq!(msg(Some(&json!([1]))), "employee_id must be a positive integer");
    }
}
