use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::{validate_jwt, AuthContext};
use crate::config;
use crate::error::ApiError;

/// Session context from the session cookie or a Bearer token.
///
/// Handlers that serve anonymous visitors take `Option<AuthContext>`.
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(ctx.clone());
        }

        let token = extract_token(&parts.headers).ok_or_else(|| ApiError::unauthorized("Not signed in"))?;
        let claims = validate_jwt(&token).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            ApiError::unauthorized("Session expired or invalid")
        })?;

        let ctx = AuthContext::from(claims);
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

/// Bearer token first, then the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer(headers).or_else(|| extract_cookie(headers, &config::config().security.cookie_name))
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str) -> String {
    let security = &config::config().security;
    let max_age = security.session_expiry_hours * 3600;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        security.cookie_name, token, max_age
    );
    if security.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config::config().security.cookie_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; agila_session=abc.def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn ignores_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("agila_session="));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn cookies_are_http_only() {
        assert!(session_cookie("t").starts_with("agila_session=t; Path=/; HttpOnly"));
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }
}
