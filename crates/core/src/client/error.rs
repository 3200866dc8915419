use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Cannot reach backend server at {base_url}. Please ensure the backend is running.")]
    Unreachable { base_url: String, detail: String },

    /// Non-2xx answer. `message` is the body's `detail` when the backend sent one.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("failed to decode {endpoint} response: {detail}")]
    Decode { endpoint: String, detail: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn http(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").map(detail_message))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error {status}"));
        Self::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_message(detail: &serde_json::Value) -> String {
    match detail {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
