//! # Authentication
//!
//! Bearer-token verification for the order endpoints. Tokens are HS256 JWTs
//! carrying the user id and role.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use order_core::{OrderError, OrderResult, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub role: Role,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Resolve the caller's user id, optionally requiring a role.
    ///
    /// Missing or invalid token is 401, a valid token with the wrong role is
    /// 403.
    pub fn authorize(&self, headers: &HeaderMap, required: Option<Role>) -> OrderResult<u64> {
        let token = bearer_token(headers)?;

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                OrderError::Unauthorized("Invalid or expired token".to_string())
            })?
            .claims;

        if let Some(role) = required {
            if claims.role != role {
                return Err(OrderError::Forbidden(format!(
                    "Access denied, {} role required",
                    role
                )));
            }
        }

        Ok(claims.id)
    }

    /// Sign a token for `user_id` valid for `ttl`
    pub fn issue_token(&self, user_id: u64, role: Role, ttl: Duration) -> OrderResult<String> {
        let claims = Claims {
            id: user_id,
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| OrderError::Configuration(format!("Failed to sign token: {}", e)))
    }
}

fn bearer_token(headers: &HeaderMap) -> OrderResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| OrderError::Unauthorized("Missing authorization token".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OrderError::Unauthorized("Malformed authorization header".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_round_trip_with_role() {
        let verifier = JwtVerifier::new("test-secret");
        let token = verifier
            .issue_token(7, Role::Seller, Duration::minutes(5))
            .unwrap();

        let id = verifier
            .authorize(&headers(&format!("Bearer {}", token)), Some(Role::Seller))
            .unwrap();
        assert_eq!(id, 7);
    }

    #[test]
    fn test_wrong_role_is_forbidden() {
        let verifier = JwtVerifier::new("test-secret");
        let token = verifier
            .issue_token(7, Role::Customer, Duration::minutes(5))
            .unwrap();

        let err = verifier
            .authorize(&headers(&format!("Bearer {}", token)), Some(Role::Seller))
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let verifier = JwtVerifier::new("test-secret");

        let err = verifier.authorize(&HeaderMap::new(), None).unwrap_err();
        assert_eq!(err.status_code(), 401);

        let err = verifier.authorize(&headers("Token abc"), None).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_foreign_and_expired_tokens() {
        let verifier = JwtVerifier::new("test-secret");
        let other = JwtVerifier::new("other-secret");

        let foreign = other
            .issue_token(7, Role::Customer, Duration::minutes(5))
            .unwrap();
        let err = verifier
            .authorize(&headers(&format!("Bearer {}", foreign)), None)
            .unwrap_err();
        assert_eq!(err.status_code(), 401);

        let expired = verifier
            .issue_token(7, Role::Customer, Duration::hours(-1))
            .unwrap();
        let err = verifier
            .authorize(&headers(&format!("Bearer {}", expired)), None)
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
