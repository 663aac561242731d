//! Error payloads returned by the backend.
//!
//! Error bodies carry a `detail` field that is either a plain string or a
//! list of validation errors (`[{"loc": [...], "msg": "...", "type": "..."}]`).
//! The body is decoded once into [`ErrorDetail`] and turned into a single
//! human-readable line with [`ErrorDetail::normalize`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

const VALIDATION_FALLBACK: &str = "Validation error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorDetail {
    PlainMessage(String),
    ValidationList(Vec<ValidationIssue>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
}

impl ErrorDetail {
    /// Decode a raw response body. Anything that is not JSON, or JSON
    /// without a usable `detail`/`message`, becomes `Unknown`.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => ErrorDetail::Unknown,
        }
    }

    pub fn from_value(body: &Value) -> Self {
        match body.get("detail") {
            Some(Value::String(s)) => ErrorDetail::PlainMessage(s.clone()),
            Some(Value::Array(items)) => {
                ErrorDetail::ValidationList(items.iter().map(ValidationIssue::from_value).collect())
            }
            Some(_) => ErrorDetail::Unknown,
            None => match body.get("message") {
                Some(Value::String(s)) => ErrorDetail::PlainMessage(s.clone()),
                _ => ErrorDetail::Unknown,
            },
        }
    }

    /// Single-line message for display, `fallback` when nothing usable was sent
    pub fn normalize(&self, fallback: &str) -> String {
        match self {
            ErrorDetail::PlainMessage(s) => s.clone(),
            ErrorDetail::ValidationList(issues) if !issues.is_empty() => issues
                .iter()
                .map(|issue| issue.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => fallback.to_string(),
        }
    }
}

impl ValidationIssue {
    fn from_value(item: &Value) -> Self {
        let message = match item {
            Value::String(s) => s.clone(),
            Value::Object(fields) => fields
                .get("msg")
                .or_else(|| fields.get("message"))
                .and_then(Value::as_str)
                .unwrap_or(VALIDATION_FALLBACK)
                .to_string(),
            _ => VALIDATION_FALLBACK.to_string(),
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_detail() {
        let detail = ErrorDetail::from_body(br#"{"detail":"bad input"}"#);
        assert_eq!(detail, ErrorDetail::PlainMessage("bad input".to_string()));
        assert_eq!(detail.normalize("Login failed"), "bad input");
    }

    #[test]
    fn test_validation_list_joined() {
        let detail = ErrorDetail::from_body(br#"{"detail":[{"msg":"a"},{"msg":"b"}]}"#);
        assert_eq!(detail.normalize("Login failed"), "a, b");
    }

    #[test]
    fn test_validation_list_mixed_items() {
        let body = br#"{"detail":[
            {"loc":["body","email"],"msg":"field required","type":"value_error.missing"},
            {"message":"password too short"},
            "username taken",
            {"loc":["body"]},
            42
        ]}"#;
        let detail = ErrorDetail::from_body(body);
        assert_eq!(
            detail.normalize("Registration failed"),
            "field required, password too short, username taken, Validation error, Validation error"
        );
    }

    #[test]
    fn test_absent_detail_uses_fallback() {
        let detail = ErrorDetail::from_body(br#"{"error":"nope"}"#);
        assert_eq!(detail, ErrorDetail::Unknown);
        assert_eq!(detail.normalize("Login failed"), "Login failed");
    }

    #[test]
    fn test_object_detail_is_unknown() {
        let detail = ErrorDetail::from_body(br#"{"detail":{"code":7}}"#);
        assert_eq!(detail, ErrorDetail::Unknown);
        assert_eq!(detail.normalize("Login failed"), "Login failed");
    }

    #[test]
    fn test_message_field_without_detail() {
        let detail = ErrorDetail::from_body(br#"{"message":"Internal server error"}"#);
        assert_eq!(detail.normalize("x"), "Internal server error");
    }

    #[test]
    fn test_non_json_body() {
        let detail = ErrorDetail::from_body(b"<html>502 Bad Gateway</html>");
        assert_eq!(detail, ErrorDetail::Unknown);
        assert_eq!(ErrorDetail::from_body(b"").normalize("fallback"), "fallback");
    }

    #[test]
    fn test_empty_list_uses_fallback() {
        let detail = ErrorDetail::from_body(br#"{"detail":[]}"#);
        assert_eq!(detail, ErrorDetail::ValidationList(vec![]));
        assert_eq!(detail.normalize("Login failed"), "Login failed");
    }
}
