mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

fn case_c1(status: &str) -> serde_json::Value {
    json!({
        "CaseNum": "C1",
        "Title": "Santos v. Dela Cruz",
        "Status": status,
        "Type": "Civil",
        "ClientID": 1,
        "ContractID": 1
    })
}

#[tokio::test]
async fn admin_updates_whole_record() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "maria", "admin123").await?;

    let reply = common::send(&app, common::api(Method::PUT, "/api/case/C1", Some(&token), Some(case_c1("Decided")))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json()?;
    assert_eq!(body["data"]["op"], "updated");
    assert_eq!(body["data"]["record"]["Status"], "Decided");

    let reply = common::send(&app, common::api(Method::GET, "/api/case/C1", Some(&token), None)?).await?;
    assert_eq!(reply.json()?["data"]["Status"], "Decided");
    Ok(())
}

#[tokio::test]
async fn non_admins_cannot_write() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "jose", "jose123").await?;

    let reply = common::send(&app, common::api(Method::PUT, "/api/case/C1", Some(&token), Some(case_c1("Closed")))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::api(Method::DELETE, "/api/payment/1", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::api(Method::GET, "/api/client", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn reads_follow_visibility() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "amy", "amy123").await?;

    let reply = common::send(&app, common::api(Method::GET, "/api/client/1", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json()?;
    assert_eq!(body["data"]["LastName"], "Santos");
    assert!(body["data"].get("pass").is_none());

    let reply = common::send(&app, common::api(Method::GET, "/api/case/C2", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::api(Method::GET, "/api/work/4", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::api(Method::GET, "/api/work/1", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_records_and_kinds() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "maria", "admin123").await?;

    let reply = common::send(&app, common::api(Method::GET, "/api/case/C9", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = common::send(&app, common::api(Method::GET, "/api/invoice/1", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = common::send(&app, common::api(Method::GET, "/api/work/abc", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = common::send(&app, common::api(Method::GET, "/api/case/C1", None, None)?).await?;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn assigned_lawyer_files_work() -> Result<()> {
    let app = common::app().await?;
    let work = json!({"CaseNum": "C1", "Title": "Pre-trial brief", "Date": "2023-03-20", "FeeAmt": 800});

    let lea = common::token(&app, "lea", "lea123").await?;
    let reply = common::send(&app, common::api(Method::POST, "/api/work", Some(&lea), Some(work.clone()))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let jose = common::token(&app, "jose", "jose123").await?;
    let reply = common::send(&app, common::api(Method::POST, "/api/work", Some(&jose), Some(work))?).await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    let body = reply.json()?;
    assert_eq!(body["data"]["op"], "created");
    assert!(body["data"]["record"]["WorkID"].as_i64().is_some());
    Ok(())
}

#[tokio::test]
async fn delete_returns_snapshot() -> Result<()> {
    let app = common::app().await?;
    let token = common::token(&app, "maria", "admin123").await?;

    let reply = common::send(&app, common::api(Method::DELETE, "/api/payment/4", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()?["data"]["record"]["Amount"], 500);

    let reply = common::send(&app, common::api(Method::GET, "/api/payment/4", Some(&token), None)?).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    Ok(())
}
