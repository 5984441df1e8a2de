use serde::{Deserialize, Serialize};

pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format";

/// JSON body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-field details sent with validation failures (HTTP 422).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: serde_json::Value,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ErrorPayload {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// Decode an error body, falling back to [`INVALID_RESPONSE_FORMAT`]
    /// when it is not JSON of the expected shape.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self::message(INVALID_RESPONSE_FORMAT))
    }

    /// Text to show the user: the backend message when present, otherwise the
    /// field errors.
    pub fn describe(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            return Some(message.to_string());
        }
        if self.errors.is_empty() {
            return None;
        }
        Some(self.field_details())
    }

    /// Field errors joined as `field: message; ...`.
    pub fn field_details(&self) -> String {
        self.errors
            .iter()
            .map(|error| match &error.field {
                serde_json::Value::String(field) => format!("{field}: {}", error.message),
                serde_json::Value::Null => error.message.clone(),
                other => format!("{other}: {}", error.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
