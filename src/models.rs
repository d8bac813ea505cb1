use serde::{Deserialize, Serialize};

/// Uniform JSON envelope: `{ok, data?, error?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            ok: true,
            data: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_omits_data() {
        let v = serde_json::to_value(ApiResponse::<()>::error("Employee not found")).unwrap();
        assert_eq!(v, json!({"ok": false, "error": "Employee not found"}));
    }

    #[test]
    fn empty_envelope_is_just_ok() {
        let v = serde_json::to_value(ApiResponse::<()>::empty()).unwrap();
        assert_eq!(v, json!({"ok": true}));
    }
}
