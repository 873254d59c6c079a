use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user email
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_access_token(email: &str, secret: &str, ttl: usize) -> Result<String, Error> {
    let issued_at = now();
    let claims = Claims {
        sub: email.to_string(),
        iat: issued_at,
        exp: issued_at + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    sign(&claims, secret)
}

pub(crate) fn sign(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Fails on a bad signature, a malformed token, or `exp` in the past.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
