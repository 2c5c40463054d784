use serde::{Deserialize, Serialize};

/// Body of every JSON response: `{ ok, message }`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiResponse {
    pub ok: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        ApiResponse {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ApiResponse {
            ok: false,
            message: message.into(),
        }
    }
}
