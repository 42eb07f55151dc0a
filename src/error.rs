use thiserror::Error;

/// Type alias for Result with TriageError
pub type Result<T> = std::result::Result<T, TriageError>;

/// Error types for the triage client
#[derive(Error, Debug)]
pub enum TriageError {
    /// Backend returned an error we have no better bucket for
    #[error("API error: {0}")]
    Api(String),

    /// Authentication failed or token was rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Server returned 5xx or asked us to back off
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected wire contract
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),

    /// Scan requested without any linked email address
    #[error("No email address is linked to this account")]
    NoLinkedEmail,

    /// Session file missing or unusable
    #[error("Session error: {0}")]
    Session(String),

    /// User cancelled an interactive operation
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic catch-all error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl TriageError {
    /// Check if the error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TriageError::Network(_) | TriageError::Server { .. }
        )
    }

    /// Check if the error is permanent and should not be retried
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Map an HTTP status code to the matching error variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => TriageError::BadRequest(message),
            401 => TriageError::Auth(message),
            403 => TriageError::Forbidden(message),
            404 => TriageError::NotFound(message),
            429 | 500..=599 => TriageError::Server { status, message },
            _ => TriageError::Api(message),
        }
    }
}

impl From<reqwest::Error> for TriageError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return TriageError::from_status(status.as_u16(), error.to_string());
        }
        if error.is_timeout() || error.is_connect() || error.is_request() {
            return TriageError::Network(error.to_string());
        }
        if error.is_decode() {
            return TriageError::InvalidPayload(error.to_string());
        }
        TriageError::Unknown(error.to_string())
    }
}
