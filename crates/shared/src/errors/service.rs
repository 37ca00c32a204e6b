use crate::errors::{cache::CacheError, repository::RepositoryError};
use crate::utils::Interrupted;
use jsonwebtoken::errors::Error as JwtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Invalid order status: {0}")]
    InvalidOrderStatus(String),

    #[error("{context}: {source}")]
    Cache {
        context: &'static str,
        #[source]
        source: CacheError,
    },

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Wraps a store failure with the step that produced it. A missing row
    /// is reported as `OrderNotFound` rather than a store fault.
    pub fn store(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| match source {
            RepositoryError::NotFound => ServiceError::OrderNotFound,
            source => ServiceError::Store { context, source },
        }
    }

    pub fn cache(context: &'static str) -> impl FnOnce(CacheError) -> Self {
        move |source| ServiceError::Cache { context, source }
    }

    /// The interruption behind this error, if the call was cancelled or ran
    /// out of time.
    pub fn interrupted(&self) -> Option<Interrupted> {
        match self {
            ServiceError::Cache {
                source: CacheError::Interrupted(reason),
                ..
            }
            | ServiceError::Store {
                source: RepositoryError::Interrupted(reason),
                ..
            } => Some(*reason),
            _ => None,
        }
    }
}
