use crate::{config::Identity, errors::ServiceError};
use std::sync::Arc;

pub type DynJwtService = Arc<dyn JwtServiceTrait + Send + Sync>;

/// Verifies bearer tokens minted elsewhere. This service never issues tokens.
pub trait JwtServiceTrait: Send + Sync + std::fmt::Debug {
    fn verify_token(&self, token: &str) -> Result<Identity, ServiceError>;
}
