use crate::{abstract_trait::JwtServiceTrait, errors::ServiceError};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated caller, as established by the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub jwt_secret: String,
}

impl JwtConfig {
    pub fn new(jwt_secret: &str) -> Self {
        JwtConfig {
            jwt_secret: jwt_secret.to_string(),
        }
    }
}

impl JwtServiceTrait for JwtConfig {
    fn verify_token(&self, token: &str) -> Result<Identity, ServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                _ => ServiceError::Jwt(err),
            })?;

        let current_time = Utc::now().timestamp() as usize;

        if token_data.claims.exp < current_time {
            return Err(ServiceError::TokenExpired);
        }

        if token_data.claims.user_id.trim().is_empty() {
            return Err(ServiceError::Validation(vec![
                "token carries an empty user_id".into(),
            ]));
        }

        Ok(Identity {
            user_id: token_data.claims.user_id,
            role: token_data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn mint(secret: &str, user_id: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: user_id.into(),
            role: "customer".into(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_a_valid_token() {
        let jwt = JwtConfig::new("secret");
        let identity = jwt.verify_token(&mint("secret", "user-1", 3600)).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.role, "customer");
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let jwt = JwtConfig::new("secret");
        let err = jwt
            .verify_token(&mint("other", "user-1", 3600))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Jwt(_)));
    }

    #[test]
    fn rejects_an_expired_token() {
        let jwt = JwtConfig::new("secret");
        let err = jwt
            .verify_token(&mint("secret", "user-1", -3600))
            .unwrap_err();
        assert!(matches!(err, ServiceError::TokenExpired));
    }
}
