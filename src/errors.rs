use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("AUTH_FAILURE: {0}")]
    AuthFailure(String),
    #[error("SOURCE_UNAVAILABLE: {0}")]
    SourceUnavailable(String),
    #[error("SOURCE_REJECTED: {0}")]
    SourceRejected(String),
    #[error("VALIDATION: {0}")]
    Validation(String),
    #[error("INTEGRITY: {0}")]
    Integrity(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for PanelError {
    fn from(value: std::io::Error) -> Self {
        Self::SourceUnavailable(value.to_string())
    }
}

impl From<rusqlite::Error> for PanelError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<anyhow::Error> for PanelError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type PanelResult<T> = Result<T, PanelError>;
