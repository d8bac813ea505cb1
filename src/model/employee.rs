use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Asha",
        "active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Asha")]
    pub name: String,

    /// `false` once the employee has been removed; the row is kept so that
    /// historical attendance stays readable.
    #[schema(example = true)]
    pub active: bool,
}

impl Employee {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
        }
    }
}

/// Next id for a new employee: one past the largest existing id, or 1.
pub fn next_id(employees: &[Employee]) -> u64 {
    employees.iter().map(|e| e.id).max().unwrap_or(0) + 1
}
