use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};

use crate::app::AppState;
use crate::auth::access::write_access;
use crate::auth::AuthContext;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::form::{FieldForm, FormOptions, FormOutcome};
use crate::handlers::pages::records::{parse_kind, record_spec, RecordPage};
use crate::handlers::pages::{parse_id, require_session};
use crate::services::records::{parent_path, MutationOutcome, RecordService};
use crate::templates::{PageError, PageResult};
use crate::types::Row;

type Posted = Vec<(String, String)>;

/// Where a form asked to come back to; only local paths are honoured
fn return_to(posted: &[(String, String)]) -> Option<String> {
    posted
        .iter()
        .find(|(k, _)| k == "_return")
        .map(|(_, v)| v.clone())
        .filter(|v| is_local_path(v))
}

/// Browsers read `/\host` as `//host` and drop tabs and newlines before resolving
fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/') | Some('\\'))
        && !path.chars().any(char::is_control)
}

/// The record a create is authorized against. A field that fails to coerce
/// must not hide the posted case, or the caller gets 403 instead of 422.
fn access_draft(form: &FieldForm, posted: &[(String, String)]) -> Row {
    let mut staged = form.clone();
    let _ = staged.apply_posted(posted);
    let mut draft = staged.draft().clone();
    let case = posted.iter().rev().find(|(k, _)| k == "CaseNum").map(|(_, v)| v.trim());
    match (draft.get("CaseNum"), case) {
        (None | Some(serde_json::Value::Null), Some(case)) if !case.is_empty() => {
            draft.insert("CaseNum".to_string(), case.into());
        }
        _ => {}
    }
    draft
}

/// Store failures shown on the form say what went wrong without leaking internals
fn store_message(err: DatabaseError) -> String {
    ApiError::from(err).message().to_string()
}

async fn save(service: &RecordService<'_>, form: &mut FieldForm, posted: &[(String, String)]) -> Result<MutationOutcome, String> {
    let submission = form
        .apply_posted(posted)
        .and_then(|_| form.submit())
        .map_err(|e| e.to_string())?;
    service.submit(submission).await.map_err(store_message)
}

fn landing(form: &FieldForm, posted: &[(String, String)], outcome: &MutationOutcome) -> String {
    match (form.outcome(), return_to(posted)) {
        (FormOutcome::Stay, Some(path)) => path,
        _ => outcome.landing_path(),
    }
}

/// POST /record/:kind/new
pub async fn create_record(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path(kind): Path<String>,
    Form(posted): Form<Posted>,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let kind = parse_kind(&kind)?;
    let service = RecordService::new(state.store());
    let options = FormOptions {
        adding: true,
        stay: return_to(&posted).is_some(),
        authorized: true,
    };
    let mut form = FieldForm::new(kind, Row::new(), record_spec(kind, true), options);

    // Work items are gated on the case they are filed under
    let draft = access_draft(&form, &posted);
    PageError::check(service.create_access(Some(ctx), kind, &draft).await?)?;

    match save(&service, &mut form, &posted).await {
        Ok(outcome) => Ok(Redirect::to(&landing(&form, &posted, &outcome)).into_response()),
        Err(reason) => {
            form.reject(reason);
            let back = return_to(&posted).unwrap_or_else(|| parent_path(kind, form.draft()));
            RecordPage {
                session: ctx,
                form: &form,
                adding: true,
                back,
            }
            .render(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// POST /record/:kind/:id - whole-record update from a form
pub async fn update_record(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path((kind, raw_id)): Path<(String, String)>,
    Form(posted): Form<Posted>,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    PageError::check(write_access(Some(ctx)))?;
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;
    let store = state.store();

    let row = store
        .fetch(kind, &id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("{} {}", kind.label(), id)))?;
    let options = FormOptions {
        adding: false,
        stay: return_to(&posted).is_some(),
        authorized: true,
    };
    let mut form = FieldForm::new(kind, row, record_spec(kind, false), options);

    let service = RecordService::new(store);
    match save(&service, &mut form, &posted).await {
        Ok(outcome) => Ok(Redirect::to(&landing(&form, &posted, &outcome)).into_response()),
        Err(reason) => {
            form.reject(reason);
            let back = return_to(&posted).unwrap_or_else(|| parent_path(kind, form.draft()));
            RecordPage {
                session: ctx,
                form: &form,
                adding: false,
                back,
            }
            .render(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// POST /record/:kind/:id/delete
pub async fn delete_record(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path((kind, raw_id)): Path<(String, String)>,
    Form(posted): Form<Posted>,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    PageError::check(write_access(Some(ctx)))?;
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;

    let outcome = RecordService::new(state.store()).delete(kind, &id).await?;
    let target = return_to(&posted).unwrap_or_else(|| outcome.landing_path());
    Ok(Redirect::to(&target).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posted(pairs: &[(&str, &str)]) -> Posted {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn return_paths_must_be_local() {
        assert_eq!(return_to(&posted(&[("_return", "/case/C1")])), Some("/case/C1".to_string()));
        assert_eq!(return_to(&posted(&[("_return", "https://evil.example")])), None);
        assert_eq!(return_to(&posted(&[("_return", "//evil.example")])), None);
        assert_eq!(return_to(&posted(&[("_return", "/\\evil.example")])), None);
        assert_eq!(return_to(&posted(&[("_return", "/\t/evil.example")])), None);
        assert_eq!(return_to(&posted(&[("_return", "/")])), Some("/".to_string()));
        assert_eq!(return_to(&posted(&[("Status", "Closed")])), None);
    }

    #[test]
    fn access_is_checked_against_the_posted_case_even_when_a_field_is_invalid() {
        use crate::types::EntityKind;
        let form = FieldForm::new(
            EntityKind::Work,
            Row::new(),
            record_spec(EntityKind::Work, true),
            FormOptions { adding: true, stay: false, authorized: true },
        );
        let draft = access_draft(&form, &posted(&[("WorkID", "abc"), ("CaseNum", "C1"), ("Title", "x")]));
        assert_eq!(draft.get("CaseNum"), Some(&serde_json::json!("C1")));

        let draft = access_draft(&form, &posted(&[("CaseNum", "C2"), ("Title", "x")]));
        assert_eq!(draft.get("CaseNum"), Some(&serde_json::json!("C2")));
    }

    #[test]
    fn store_failures_do_not_leak_sql() {
        let message = store_message(DatabaseError::QueryError("relation \"Case\" does not exist".into()));
        assert!(!message.contains("relation"));
    }
}
