mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn gated_pages_redirect_visitors_to_login() -> Result<()> {
    let app = common::app().await?;
    for uri in ["/case/all", "/case/C1", "/client/all", "/client/1", "/lawyer/all", "/lawyer/1", "/record/work/1"] {
        let reply = common::send(&app, common::get(uri, None)?).await?;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(reply.location(), Some("/login"), "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn case_page_totals_billing() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "maria", "admin123").await?;
    let reply = common::send(&app, common::get("/case/C1", Some(&cookie))?).await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Santos v. Dela Cruz"));
    assert!(reply.body.contains("Garcia, Jose"));
    assert!(reply.body.contains("Initial consultation"));
    assert!(reply.body.contains("Php 4,000.5"));
    assert!(reply.body.contains("/record/work/new?CaseNum=C1"));
    Ok(())
}

#[tokio::test]
async fn unassigned_lawyer_cannot_open_case() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "lea", "lea123").await?;

    let reply = common::send(&app, common::get("/case/C1", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::get("/case/C3", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn client_sees_own_cases_only() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "amy", "amy123").await?;

    let reply = common::send(&app, common::get("/case/all", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Santos Estate"));
    assert!(!reply.body.contains("People v. Bautista"));

    let reply = common::send(&app, common::get("/case/C2", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::get("/client/all", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn missing_case_is_not_found() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "maria", "admin123").await?;
    let reply = common::send(&app, common::get("/case/C404", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn table_state_rides_in_the_query_string() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "maria", "admin123").await?;

    let reply = common::send(&app, common::get("/case/all?cases.f.Title=santos", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Santos v. Dela Cruz"));
    assert!(reply.body.contains("Santos Estate"));
    assert!(!reply.body.contains("People v. Bautista"));

    let reply = common::send(&app, common::get("/case/C1?works.min.FeeAmt=2000", Some(&cookie))?).await?;
    assert!(reply.body.contains("Drafting of complaint"));
    assert!(!reply.body.contains("Initial consultation"));
    Ok(())
}

#[tokio::test]
async fn selecting_a_client_shows_their_cases() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "maria", "admin123").await?;

    let reply = common::send(&app, common::get("/client/all?clients.sel=2", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("People v. Bautista"));
    assert!(!reply.body.contains("Santos Estate"));
    Ok(())
}

#[tokio::test]
async fn lawyer_lists_are_admin_only() -> Result<()> {
    let app = common::app().await?;
    let cookie = common::login(&app, "jose", "jose123").await?;

    let reply = common::send(&app, common::get("/lawyer/all", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = common::send(&app, common::get("/lawyer/2", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("People v. Bautista"));

    let reply = common::send(&app, common::get("/lawyer/3", Some(&cookie))?).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    Ok(())
}
