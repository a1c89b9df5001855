#![allow(dead_code)]

use agila::app::{memory_state, router};
use agila::database::Fixture;
use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh memory store seeded with the demo practice
pub async fn app() -> Result<Router> {
    let fixture = Fixture::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/demo.json"))?;
    Ok(router(memory_state(fixture).await?))
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).with_context(|| format!("not JSON: {}", self.body))
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<Reply> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(Reply {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

pub fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::from(body.to_string()))?)
}

pub fn api(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    Ok(builder.body(body)?)
}

/// Form login; returns the `name=value` cookie pair
pub async fn login(app: &Router, user: &str, pass: &str) -> Result<String> {
    let reply = send(app, post_form("/login", None, &format!("user={}&pass={}", user, pass))?).await?;
    anyhow::ensure!(reply.status == StatusCode::SEE_OTHER, "login for {} returned {}", user, reply.status);
    let cookie = reply
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .context("login set no cookie")?;
    Ok(cookie.split(';').next().unwrap_or_default().to_string())
}

/// JSON login; returns the bearer token
pub async fn token(app: &Router, user: &str, pass: &str) -> Result<String> {
    let body = serde_json::json!({ "user": user, "pass": pass });
    let reply = send(app, api(Method::POST, "/api/auth/login", None, Some(body))?).await?;
    anyhow::ensure!(reply.status == StatusCode::OK, "api login for {} returned {}", user, reply.status);
    reply.json()?["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("no token in login response")
}
