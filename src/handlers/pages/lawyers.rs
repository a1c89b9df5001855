use axum::extract::{Path, RawQuery, State};
use serde_json::Value;

use crate::app::AppState;
use crate::auth::access::{lawyer_access, lawyer_list_access, write_access, Access};
use crate::auth::AuthContext;
use crate::database::Selector;
use crate::form::{FieldForm, FormOptions, FormSpec};
use crate::table::{Cell, ColumnSpec, Table, TableLinks};
use crate::templates::{page, page_context, PageError, PageResult};
use crate::types::{EntityKind, RecordId, Row};

use super::{display_row, parse_id, query_params, render_table, require_session};

/// GET /lawyer/all - admins only
pub async fn all_lawyers(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    PageError::check(lawyer_list_access(session.as_ref()))?;
    let rows: Vec<Row> = state
        .store()
        .list(EntityKind::Lawyer, Selector::All)
        .await?
        .iter()
        .map(|l| display_row(EntityKind::Lawyer, l))
        .collect();

    let columns = vec![
        ColumnSpec::new("LawyerID").header("ID"),
        ColumnSpec::new("Name"),
        ColumnSpec::new("Email"),
        ColumnSpec::new("isManager")
            .header("Manager")
            .no_filter()
            .render(|value: &Value, _: &Row| match value {
                Value::Bool(true) => Cell::text("Yes"),
                _ => Cell::empty(),
            }),
    ];
    let params = query_params(raw);
    let table = Table::new(rows, columns).id_column("LawyerID");
    let links = TableLinks::new("/lawyer/all", &params, "lawyers").navigate("/lawyer/{id}");

    let mut context = page_context("Lawyers", session.as_ref());
    context.insert("lawyers", &render_table(table, &links));
    page("lawyers.html", &context)
}

/// GET /lawyer/:id - profile form and assigned cases; admins or the lawyer themselves
pub async fn lawyer_page(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path(raw_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let id = parse_id(EntityKind::Lawyer, &raw_id)?;
    let lawyer_id = match &id {
        RecordId::Int(n) => *n,
        RecordId::Text(_) => return Err(PageError::NotFound(format!("Lawyer {}", raw_id))),
    };
    PageError::check(lawyer_access(Some(ctx), lawyer_id))?;

    let store = state.store();
    let row = store
        .fetch(EntityKind::Lawyer, &id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("Lawyer {}", lawyer_id)))?;
    let name = display_row(EntityKind::Lawyer, &row)
        .get("Name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let options = FormOptions {
        adding: false,
        stay: true,
        authorized: write_access(Some(ctx)) == Access::Allow,
    };
    let form = FieldForm::new(EntityKind::Lawyer, row, FormSpec::for_entity(EntityKind::Lawyer), options);

    let cases = store.cases_for_lawyer(lawyer_id).await?;
    let columns = vec![
        ColumnSpec::new("CaseNum").header("Case Number"),
        ColumnSpec::new("Title"),
        ColumnSpec::new("Status"),
    ];
    let params = query_params(raw);
    let path = format!("/lawyer/{}", lawyer_id);
    let table = Table::new(cases, columns)
        .id_column("CaseNum")
        .selector_highlight(false);
    let links = TableLinks::new(&path, &params, "cases").navigate("/case/{id}");

    let mut context = page_context(&name, Some(ctx));
    context.insert("lawyer_name", &name);
    context.insert("form", &form.view());
    context.insert("form_action", &format!("/record/lawyer/{}", lawyer_id));
    context.insert("back", &path);
    context.insert("cases", &render_table(table, &links));
    page("lawyer.html", &context)
}
