use thiserror::Error;

use crate::domain::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}
