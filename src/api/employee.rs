use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::core::employees::{self, EmployeeChanges};
use crate::error::AppError;
use crate::models::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Asha")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, ToSchema, Default)]
pub struct UpdateEmployee {
    #[schema(example = "Asha K")]
    pub name: Option<String>,
    #[schema(example = true)]
    pub active: Option<bool>,
}

/// List active employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Active employees in sheet order", body = [crate::model::employee::Employee]),
        (status = 502, description = "Store unreachable")
    ),
    tag = "Employee"
)]
pub async fn list_employees(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let list = employees::list_active(state.store.as_ref()).await?;
    debug!(count = list.len(), "Listed employees");
    Ok(HttpResponse::Ok().json(ApiResponse::success(list)))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = crate::model::employee::Employee),
        (status = 400, description = "Empty name", body = Object, example = json!({
            "ok": false,
            "error": "Employee name cannot be empty"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    state: web::Data<AppState>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let name = payload.name.as_deref().unwrap_or_default();
    let employee = employees::add(state.store.as_ref(), name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(employee)))
}

/// Get Employee by ID (active or not)
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee = employees::get(state.store.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employee)))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::Employee),
        (status = 400, description = "Empty name or no fields"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "ok": false,
            "error": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let UpdateEmployee { name, active } = payload.into_inner();
    let employee = employees::update(
        state.store.as_ref(),
        path.into_inner(),
        EmployeeChanges { name, active },
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(employee)))
}

/// Delete Employee (soft delete)
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Deactivated", body = Object, example = json!({ "ok": true })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    employees::deactivate(state.store.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::empty()))
}
