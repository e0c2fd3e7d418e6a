use thiserror::Error;

use crate::models::ParseError;

/// Failures talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid category payload: {0}")]
    Payload(#[from] ParseError),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
