mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn form_login_sets_session_cookie() -> Result<()> {
    let app = common::app().await?;
    let reply = common::send(&app, common::post_form("/login", None, "user=maria&pass=admin123")?).await?;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/"));
    let cookie = reply.headers.get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(cookie.starts_with("agila_session="));
    assert!(cookie.contains("HttpOnly"));
    Ok(())
}

#[tokio::test]
async fn banner_shows_signed_in_admin() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "maria", "admin123").await?;
    let reply = common::send(&app, common::get("/", Some(&cookie))?).await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Signed in as Reyes, Maria Lopez"));
    assert!(reply.body.contains("(Admin)"));
    Ok(())
}

#[tokio::test]
async fn wrong_password_rerenders_login() -> Result<()> {
    let app = common::app().await?;
    let reply = common::send(&app, common::post_form("/login", None, "user=maria&pass=nope")?).await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.headers.get(header::SET_COOKIE).is_none());
    assert!(reply.body.contains("Invalid username or password"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "amy", "amy123").await?;
    let reply = common::send(&app, common::post_form("/logout", Some(&cookie), "")?).await?;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), Some("/login"));
    let cleared = reply.headers.get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(cleared.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn api_login_and_whoami() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "jose", "jose123").await?;

    let reply = common::send(&app, common::api(Method::GET, "/api/auth/whoami", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json()?;
    assert_eq!(body["data"]["is_lawyer"], true);
    assert_eq!(body["data"]["is_admin"], false);
    assert_eq!(body["data"]["user_id"], 2);
    Ok(())
}

#[tokio::test]
async fn api_login_rejects_bad_credentials() -> Result<()> {
    let app = common::app().await?;
    let body = json!({ "user": "jose", "pass": "wrong" });
    let reply = common::send(&app, common::api(Method::POST, "/api/auth/login", None, Some(body))?).await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()?["error"], true);

    let reply = common::send(&app, common::api(Method::GET, "/api/auth/whoami", None, None)?).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
