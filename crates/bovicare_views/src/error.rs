//! Error types for the view layer.

use bovicare_client::BovicareError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("API error: {0}")]
    Api(#[from] BovicareError),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The view that started the load went away before it finished.
    #[error("view closed before the load finished")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ViewError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ViewError::Cancelled)
    }
}

impl From<String> for ViewError {
    fn from(err: String) -> Self {
        ViewError::Internal(err)
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
