use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Backend not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Expected a row back from {0}, got none")]
    EmptyResponse(&'static str),
}

impl ApiError {
    /// Network-level failure (DNS, refused connection, timeout)
    pub fn is_offline(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
