use crate::utils::Interrupted;
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(#[from] SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    #[error("Custom: {0}")]
    Custom(String),
}
