use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::AppState;
use crate::auth::access::{write_access, Access};
use crate::auth::AuthContext;
use crate::database::schema::without_secrets;
use crate::database::Selector;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::records::{MutationOutcome, RecordService};
use crate::types::{EntityKind, RecordId, Row};

fn parse_kind(raw: &str) -> Result<EntityKind, ApiError> {
    raw.parse::<EntityKind>().map_err(ApiError::not_found)
}

fn parse_id(kind: EntityKind, raw: &str) -> Result<RecordId, ApiError> {
    kind.parse_id(raw).map_err(ApiError::bad_request)
}

fn require(access: Access) -> Result<(), ApiError> {
    match access {
        Access::Allow => Ok(()),
        Access::Deny => Err(ApiError::forbidden("Insufficient permissions")),
        Access::Login => Err(ApiError::unauthorized("Not signed in")),
    }
}

/// GET /api/auth/whoami
pub async fn whoami(ctx: AuthContext) -> ApiResult<AuthContext> {
    Ok(ApiResponse::success(ctx))
}

/// GET /api/:kind - every row of a table, admins only
pub async fn list_records(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(kind): Path<String>,
) -> ApiResult<Vec<Row>> {
    require(write_access(Some(&ctx)))?;
    let kind = parse_kind(&kind)?;
    let rows = RecordService::new(state.store()).list(kind, Selector::All).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/:kind/:id - one record, if the session may see it
pub async fn get_record(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((kind, raw_id)): Path<(String, String)>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;
    let store = state.store();

    let row = store
        .fetch(kind, &id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", kind.label(), id)))?;
    require(RecordService::new(store).access(Some(&ctx), kind, &row).await?)?;
    Ok(ApiResponse::success(without_secrets(kind, &row)))
}

/// POST /api/:kind
pub async fn create_record(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(kind): Path<String>,
    Json(record): Json<Row>,
) -> ApiResult<MutationOutcome> {
    let kind = parse_kind(&kind)?;
    let service = RecordService::new(state.store());
    require(service.create_access(Some(&ctx), kind, &record).await?)?;
    let outcome = service.create(kind, record).await?;
    Ok(ApiResponse::created(outcome.redacted()))
}

/// PUT /api/:kind/:id - full-record update; returns the stored snapshot
pub async fn update_record(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((kind, raw_id)): Path<(String, String)>,
    Json(record): Json<Row>,
) -> ApiResult<MutationOutcome> {
    require(write_access(Some(&ctx)))?;
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;
    let outcome = RecordService::new(state.store()).update(kind, &id, record).await?;
    Ok(ApiResponse::success(outcome.redacted()))
}

/// DELETE /api/:kind/:id - returns the removed snapshot
pub async fn delete_record(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path((kind, raw_id)): Path<(String, String)>,
) -> ApiResult<MutationOutcome> {
    require(write_access(Some(&ctx)))?;
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;
    let outcome = RecordService::new(state.store()).delete(kind, &id).await?;
    Ok(ApiResponse::success(outcome.redacted()))
}
