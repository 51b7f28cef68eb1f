use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use quill_types::api::Claims;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Issues and validates signed, time-limited session tokens. Stateless:
/// validity is signature + expiry, nothing is persisted server-side.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
            validation: Validation::new(algorithm),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };
        encode(&self.header, &claims, &self.encoding)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Algorithm::HS256, 30)
    }

    #[test]
    fn round_trip_preserves_user_id() {
        let svc = service();
        let token = svc.issue(7).unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.user_id, 7);
    }

    #[test]
    fn expired_token_is_rejected() {
        // issued 5 minutes in the past, beyond the default 60s leeway
        let svc = TokenService::new("test-secret", Algorithm::HS256, -5);
        let token = svc.issue(7).unwrap();
        assert_eq!(svc.validate(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = service().issue(7).unwrap();
        let other = TokenService::new("different-secret", Algorithm::HS256, 30);
        assert_eq!(other.validate(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            service().validate("not.a.token").unwrap_err(),
            TokenError::Invalid
        );
    }
}
