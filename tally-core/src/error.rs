use thiserror::Error;

/// Unified error type for Tally.
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Route configuration unresolvable: {0}")]
    Configuration(String),

    #[error("Invalid route pattern '{template}': {reason}")]
    Pattern { template: String, reason: String },

    #[error("Caller identity missing")]
    UserRequired,

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TallyError {
    /// Map to HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            TallyError::UserRequired => 401,
            _ => 500,
        }
    }

    /// JSON error body served to API callers.
    pub fn to_json_body(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "status": self.status_code(),
        })
    }
}
