use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // === APPLICATION ERRORS ===
    /// Client-side validation failure. Never the result of a network call.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx API response with the server-asserted message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 401 from the backend. Fatal for the current session: the caller is
    /// expected to clear the stored token and return to the auth screen.
    #[error("Session expired: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Builds the error for a non-2xx response, mapping 401 to the
    /// session-fatal variant and 404 to `NotFound`.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => AppError::Unauthorized(message),
            404 => AppError::NotFound(message),
            _ => AppError::Api { status, message },
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }

    /// The human-readable text shown in inline error banners.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(e) => {
                log::error!("Network error: {}", e);
                "Network error. Please try again.".to_string()
            }
            AppError::Decode(e) => {
                log::error!("Decode error: {}", e);
                "Unexpected response from the server.".to_string()
            }
            other => other.to_string(),
        }
    }
}
