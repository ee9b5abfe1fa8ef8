use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// A required field is missing or malformed. Detected before any write.
    #[error("{0}")]
    Validation(String),

    /// The record does not exist or belongs to another user.
    #[error("{0}")]
    NotFound(String),

    /// The storage layer failed; any open transaction has been rolled back.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ScanError {
    pub fn scan_not_found() -> Self {
        Self::NotFound("Scan not found".to_string())
    }
}

impl From<sqlx::Error> for ScanError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
