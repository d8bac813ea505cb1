//! Typed wrapper over the HTTP API, the same calls the kiosk and admin pages
//! make. Non-ok envelopes come back as the matching [`AppError`].

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::model::attendance::{AttendanceRecord, MonthlyMatrix, TodayCount, YearMonth};
use crate::model::employee::Employee;
use crate::models::ApiResponse;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> AppResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let status = resp.status();

        let envelope: ApiResponse<T> = resp.json().await.map_err(|e| {
            AppError::transport(format!("Unexpected response ({status}): {e}"))
        })?;
        if envelope.ok {
            return Ok(envelope.data);
        }
        let message = envelope
            .error
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        let code = if status.is_success() {
            StatusCode::BAD_GATEWAY.as_u16()
        } else {
            status.as_u16()
        };
        Err(AppError::from_status(code, message))
    }

    async fn data<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(method, path, body)
            .await?
            .ok_or_else(|| AppError::transport("Response carried no data"))
    }

    pub async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        self.data::<(), _>(Method::GET, "/employees", None).await
    }

    pub async fn get_employee(&self, id: u64) -> AppResult<Employee> {
        self.data::<(), _>(Method::GET, &format!("/employees/{id}"), None)
            .await
    }

    pub async fn add_employee(&self, name: &str) -> AppResult<Employee> {
        self.data(Method::POST, "/employees", Some(&json!({ "name": name })))
            .await
    }

    pub async fn rename_employee(&self, id: u64, name: &str) -> AppResult<Employee> {
        self.data(
            Method::PUT,
            &format!("/employees/{id}"),
            Some(&json!({ "name": name })),
        )
        .await
    }

    pub async fn set_employee_active(&self, id: u64, active: bool) -> AppResult<Employee> {
        self.data(
            Method::PUT,
            &format!("/employees/{id}"),
            Some(&json!({ "active": active })),
        )
        .await
    }

    pub async fn deactivate_employee(&self, id: u64) -> AppResult<()> {
        self.call::<(), serde_json::Value>(Method::DELETE, &format!("/employees/{id}"), None)
            .await?;
        Ok(())
    }

    /// `kiosk_id` of `None` lets the server use its default kiosk.
    pub async fn mark_attendance(
        &self,
        employee_id: u64,
        kiosk_id: Option<&str>,
    ) -> AppResult<AttendanceRecord> {
        let body = json!({ "employee_id": employee_id, "kiosk_id": kiosk_id });
        self.data(Method::POST, "/attendance", Some(&body)).await
    }

    pub async fn monthly_matrix(&self, month: YearMonth) -> AppResult<MonthlyMatrix> {
        self.data::<(), _>(Method::GET, &format!("/attendance?month={month}"), None)
            .await
    }

    pub async fn today_count(&self) -> AppResult<TodayCount> {
        self.data::<(), _>(Method::GET, "/attendance/today", None)
            .await
    }
}
