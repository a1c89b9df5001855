mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn health_reports_memory_store() -> Result<()> {
    let app = common::app().await?;
    let reply = common::send(&app, common::get("/health", None)?).await?;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json()?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn home_page_offers_login_to_visitors() -> Result<()> {
    let app = common::app().await?;
    let reply = common::send(&app, common::get("/", None)?).await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("href=\"/login\""));
    assert!(!reply.body.contains("Signed in as"));
    Ok(())
}
