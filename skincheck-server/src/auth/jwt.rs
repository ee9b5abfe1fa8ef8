use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Clock skew tolerated when checking `exp`, in seconds.
const LEEWAY_SECS: u64 = 5;

/// Access token claims. `sub` carries the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Why a request could not be authenticated. The display text is the
/// response body.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token is required")]
    MissingToken,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Turns a bearer token into the id of the user it was issued to.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Uuid, AuthError>;
}

/// HS256 verifier sharing its secret with the identity provider.
#[derive(Clone)]
pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenVerifier")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl JwtTokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    pub fn issue(
        &self,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        };
        self.sign(&claims)
    }

    pub fn sign(
        &self,
        claims: &Claims,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    #[test]
    fn issued_token_verifies() {
        let verifier = JwtTokenVerifier::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = verifier
            .issue(user_id, Duration::minutes(15))
            .expect("issue token");

        assert_eq!(verifier.verify(&token), Ok(user_id));
        let claims = verifier.decode_claims(&token).expect("claims");
        assert!(claims.jti.is_some());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let verifier = JwtTokenVerifier::new(SECRET);
        let token = verifier
            .issue(Uuid::new_v4(), Duration::hours(-1))
            .expect("issue token");

        assert_eq!(verifier.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let issuer = JwtTokenVerifier::new("some-other-secret-entirely-123456");
        let verifier = JwtTokenVerifier::new(SECRET);
        let token = issuer
            .issue(Uuid::new_v4(), Duration::minutes(5))
            .expect("issue token");

        assert_eq!(verifier.verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let verifier = JwtTokenVerifier::new(SECRET);
        assert_eq!(verifier.verify("not.a.jwt"), Err(AuthError::Invalid));
        assert_eq!(verifier.verify(""), Err(AuthError::Invalid));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        #[derive(Serialize)]
        struct LegacyClaims {
            sub: String,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &LegacyClaims {
                sub: "42".to_string(),
                exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("encode");

        let verifier = JwtTokenVerifier::new(SECRET);
        assert_eq!(verifier.verify(&token), Err(AuthError::Invalid));
    }
}
