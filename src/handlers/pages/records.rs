use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::app::AppState;
use crate::auth::access::{write_access, Access};
use crate::auth::AuthContext;
use crate::form::{FieldForm, FormOptions, FormSpec};
use crate::services::records::{parent_path, RecordService};
use crate::table::query::path_segment;
use crate::templates::{page_context, render, PageError, PageResult};
use crate::types::{EntityKind, Row};

use super::{parse_id, query_params, require_session};

/// Form layout per entity for the generic record page
pub(crate) fn record_spec(kind: EntityKind, adding: bool) -> FormSpec {
    let spec = FormSpec::for_entity(kind);
    let spec = match kind {
        EntityKind::Case => spec.identifiers(&["ContractID", "ClientID"]).textarea(&["Status"]),
        EntityKind::Work => spec.identifiers(&["CaseNum"]),
        EntityKind::Payment => spec.identifiers(&["ClientID"]),
        EntityKind::Contract => spec.textarea(&["Terms"]),
        EntityKind::Client => spec.identifiers(&["ContractID"]),
        EntityKind::Lawyer => spec,
    };
    if adding && matches!(kind, EntityKind::Client | EntityKind::Lawyer) {
        spec.reveal(&["pass"])
    } else {
        spec
    }
}

pub(crate) fn parse_kind(raw: &str) -> Result<EntityKind, PageError> {
    raw.parse::<EntityKind>()
        .map_err(|_| PageError::NotFound(format!("Record type {}", raw)))
}

/// Everything the record template shows besides the form itself
pub(crate) struct RecordPage<'a> {
    pub session: &'a AuthContext,
    pub form: &'a FieldForm,
    pub adding: bool,
    pub back: String,
}

impl RecordPage<'_> {
    pub(crate) fn render(&self, status: StatusCode) -> PageResult {
        let kind = self.form.kind();
        let id = kind.id_of(self.form.draft()).map(|id| path_segment(&id.to_string()));
        let (heading, action, submit_label) = match (&id, self.adding) {
            (Some(id), false) => (
                format!("{} {}", kind.label(), id),
                format!("/record/{}/{}", kind, id),
                "Save",
            ),
            _ => (
                format!("New {}", kind.label()),
                format!("/record/{}/new", kind),
                "Create",
            ),
        };
        let delete_action = match (&id, self.adding, self.session.is_admin) {
            (Some(id), false, true) => Some(format!("/record/{}/{}/delete", kind, id)),
            _ => None,
        };

        let mut context = page_context(&heading, Some(self.session));
        context.insert("heading", &heading);
        context.insert("form", &self.form.view());
        context.insert("form_action", &action);
        context.insert("submit_label", submit_label);
        context.insert("delete_action", &delete_action);
        context.insert("back", &self.back);
        Ok((status, Html(render("record.html", &context)?)).into_response())
    }
}

/// GET /record/:kind/new - blank form, prefilled from the query string (e.g. `?CaseNum=C1`)
pub async fn new_record_page(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path(kind): Path<String>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let kind = parse_kind(&kind)?;
    let options = FormOptions {
        adding: true,
        stay: false,
        authorized: true,
    };
    let mut form = FieldForm::new(kind, Row::new(), record_spec(kind, true), options);
    for (key, value) in query_params(raw) {
        if form.spec().field(&key).is_some() {
            if let Err(e) = form.edit(&key, value) {
                tracing::debug!("Ignoring prefill: {}", e);
            }
        }
    }

    let service = RecordService::new(state.store());
    PageError::check(service.create_access(Some(ctx), kind, form.draft()).await?)?;

    let back = match (parent_path(kind, form.draft()).as_str(), kind) {
        ("/", EntityKind::Client | EntityKind::Case | EntityKind::Lawyer) => format!("/{}/all", kind),
        (path, _) => path.to_string(),
    };
    RecordPage {
        session: ctx,
        form: &form,
        adding: true,
        back,
    }
    .render(StatusCode::OK)
}

/// GET /record/:kind/:id - the record's form; read-only unless the session may write
pub async fn record_page(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path((kind, raw_id)): Path<(String, String)>,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let kind = parse_kind(&kind)?;
    let id = parse_id(kind, &raw_id)?;
    let store = state.store();

    let row = store
        .fetch(kind, &id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("{} {}", kind.label(), id)))?;
    PageError::check(RecordService::new(store).access(Some(ctx), kind, &row).await?)?;

    let options = FormOptions {
        adding: false,
        stay: false,
        authorized: write_access(Some(ctx)) == Access::Allow,
    };
    let back = parent_path(kind, &row);
    let form = FieldForm::new(kind, row, record_spec(kind, false), options);
    RecordPage {
        session: ctx,
        form: &form,
        adding: false,
        back,
    }
    .render(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldKind;

    #[test]
    fn record_specs_fix_ownership_keys() {
        let spec = record_spec(EntityKind::Work, false);
        assert!(spec.field("CaseNum").unwrap().identifier);
        assert!(spec.field("WorkID").unwrap().identifier);

        let spec = record_spec(EntityKind::Case, false);
        assert_eq!(spec.field("Status").unwrap().kind, FieldKind::Textarea);
    }

    #[test]
    fn credentials_are_only_editable_when_adding() {
        assert_eq!(record_spec(EntityKind::Client, false).field("pass").unwrap().kind, FieldKind::Hidden);
        assert_eq!(record_spec(EntityKind::Client, true).field("pass").unwrap().kind, FieldKind::Text);
    }

    #[test]
    fn unknown_kinds_are_not_found() {
        assert!(matches!(parse_kind("invoice"), Err(PageError::NotFound(_))));
        assert_eq!(parse_kind("work").unwrap(), EntityKind::Work);
    }
}
