pub mod access;
pub mod credentials;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

pub use access::{Access, AuthContext, Principal};

/// Signed session payload; role flags are fixed at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub principal: Principal,
    pub user_id: i64,
    pub name: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(ctx: &AuthContext) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.session_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            principal: ctx.principal,
            user_id: ctx.user_id,
            name: ctx.name.clone(),
            is_admin: ctx.is_admin,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        AuthContext::new(claims.principal, claims.user_id, claims.name, claims.is_admin)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Issue a token for an authenticated principal
pub fn issue_token(ctx: &AuthContext) -> Result<String, JwtError> {
    generate_jwt(&Claims::new(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_role_flags() {
        let ctx = AuthContext::new(Principal::Lawyer, 1, "Reyes, Maria".into(), true);
        let token = issue_token(&ctx).unwrap();
        let back: AuthContext = validate_jwt(&token).unwrap().into();
        assert_eq!(back, ctx);
        assert!(back.is_lawyer && back.is_admin && !back.is_client);
    }

    #[test]
    fn rejects_tampered_tokens() {
        let ctx = AuthContext::new(Principal::Client, 3, "Castro, Cy".into(), false);
        let mut token = issue_token(&ctx).unwrap();
        token.push('x');
        assert!(matches!(validate_jwt(&token), Err(JwtError::InvalidToken(_))));
    }
}
