use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{credentials::authorize, issue_token, AuthContext};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{clear_session_cookie, session_cookie, ApiResponse, ApiResult};
use crate::templates::{page, page_context, render, PageResult};

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AuthContext,
    /// Seconds
    pub expires_in: u64,
}

/// GET /login
pub async fn login_page(session: Option<AuthContext>) -> PageResult {
    if session.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    page("login.html", &page_context("Login", None))
}

/// POST /login - form login; sets the session cookie and goes home
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> PageResult {
    match authorize(state.store(), form.user.trim(), &form.pass).await? {
        Some(ctx) => {
            let token = issue_token(&ctx)?;
            Ok(([(header::SET_COOKIE, session_cookie(&token))], Redirect::to("/")).into_response())
        }
        None => {
            let mut context = page_context("Login", None);
            context.insert("error", "Invalid username or password");
            context.insert("user", form.user.trim());
            Ok((StatusCode::UNAUTHORIZED, Html(render("login.html", &context)?)).into_response())
        }
    }
}

/// POST /logout
pub async fn logout(session: Option<AuthContext>) -> Response {
    if let Some(ctx) = session {
        tracing::info!("{} signed out", ctx.name);
    }
    ([(header::SET_COOKIE, clear_session_cookie())], Redirect::to("/login")).into_response()
}

/// POST /api/auth/login - JSON login for API clients
pub async fn api_login(State(state): State<AppState>, Json(body): Json<LoginForm>) -> ApiResult<LoginResponse> {
    let ctx = authorize(state.store(), body.user.trim(), &body.pass)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;
    let token = issue_token(&ctx)?;
    Ok(ApiResponse::success(LoginResponse {
        token,
        user: ctx,
        expires_in: config::config().security.session_expiry_hours * 3600,
    }))
}
