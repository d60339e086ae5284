use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("NETWORK_FAILURE: {0}")]
    Network(String),
    #[error("API_ERROR {status}: {message}")]
    Api { status: u16, message: String },
    #[error("AUTH_REQUIRED: {0}")]
    Auth(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("DECODE_FAILURE: {0}")]
    Decode(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
