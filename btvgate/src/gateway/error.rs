use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures talking to the hosted backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("remote store is not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("invalid remote store URL: {0}")]
    InvalidUrl(String),

    #[error("remote store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response from remote store: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Configuration problems are not worth retrying and map to a 500.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            GatewayError::NotConfigured(_) | GatewayError::InvalidUrl(_)
        )
    }
}

/// Pull a readable message out of an error body.
///
/// PostgREST uses `message`, the storage API uses `error` or `msg`.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error", "msg"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
