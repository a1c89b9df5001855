use axum::extract::{Path, RawQuery, State};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use url::form_urlencoded;

use crate::app::AppState;
use crate::auth::access::{can_add_work, case_access, case_list_access, write_access, Access};
use crate::auth::AuthContext;
use crate::billing::{format_php, total_billing};
use crate::database::models::{Case, Lawyer, Work};
use crate::database::repository::decode;
use crate::database::{Repository, Selector};
use crate::form::{FieldForm, FormOptions, FormSpec};
use crate::services::records::int;
use crate::table::query::path_segment;
use crate::table::{cells, ColumnSpec, FilterKind, Table, TableLinks};
use crate::templates::{page, page_context, PageError, PageResult};
use crate::types::{EntityKind, RecordId, Row};

use super::{actions_column, display_row, query_params, render_table, require_session};

#[derive(Debug, Serialize)]
struct AssignedLawyer {
    id: i64,
    name: String,
    email: Option<String>,
}

/// GET /case/all - every case for admins, assigned cases for lawyers, own cases for clients
pub async fn all_cases(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    PageError::check(case_list_access(session.as_ref()))?;
    let ctx = require_session(session.as_ref())?;
    let store = state.store();

    let cases = if ctx.is_admin {
        store.list(EntityKind::Case, Selector::All).await?
    } else if let Some(lawyer_id) = ctx.lawyer_id() {
        store.cases_for_lawyer(lawyer_id).await?
    } else {
        store.list(EntityKind::Case, Selector::eq("ClientID", ctx.user_id)).await?
    };

    let mut client_ids: Vec<i64> = cases.iter().filter_map(|c| int(c, "ClientID")).collect();
    client_ids.sort_unstable();
    client_ids.dedup();
    let names: HashMap<i64, Value> = if client_ids.is_empty() {
        HashMap::new()
    } else {
        store
            .list(
                EntityKind::Client,
                Selector::any_of("ClientID", client_ids.into_iter().map(Value::from).collect()),
            )
            .await?
            .iter()
            .map(|c| display_row(EntityKind::Client, c))
            .filter_map(|c| Some((int(&c, "ClientID")?, c.get("Name")?.clone())))
            .collect()
    };
    let rows: Vec<Row> = cases
        .into_iter()
        .map(|mut case| {
            let name = int(&case, "ClientID").and_then(|id| names.get(&id).cloned());
            case.insert("Client".to_string(), name.unwrap_or(Value::Null));
            case
        })
        .collect();

    let columns = vec![
        ColumnSpec::new("CaseNum").header("Case Number"),
        ColumnSpec::new("Title"),
        ColumnSpec::new("Status"),
        ColumnSpec::new("Type"),
        ColumnSpec::new("Client"),
    ];
    let params = query_params(raw);
    let table = Table::new(rows, columns).id_column("CaseNum");
    let links = TableLinks::new("/case/all", &params, "cases").navigate("/case/{id}");

    let mut context = page_context("Cases", Some(ctx));
    context.insert("cases", &render_table(table, &links));
    page("cases.html", &context)
}

/// GET /case/:id - assigned lawyers, case form, work items and total billing
pub async fn case_page(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path(case_num): Path<String>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let store = state.store();
    let id = EntityKind::Case
        .parse_id(&case_num)
        .map_err(|_| PageError::NotFound(format!("Case {}", case_num)))?;

    let row = store
        .fetch(EntityKind::Case, &id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("Case {}", case_num)))?;
    let case: Case = decode(EntityKind::Case, row.clone())?;

    let lawyers: Vec<Lawyer> = store
        .lawyers_for_case(&case.case_num)
        .await?
        .into_iter()
        .map(|r| decode(EntityKind::Lawyer, r))
        .collect::<Result<_, _>>()?;
    let lawyer_ids: Vec<i64> = lawyers.iter().map(|l| l.lawyer_id).collect();
    PageError::check(case_access(Some(ctx), case.client_id, &lawyer_ids))?;

    let is_admin = write_access(Some(ctx)) == Access::Allow;
    let params = query_params(raw);
    let path = format!("/case/{}", path_segment(&case.case_num));

    let spec = FormSpec::for_entity(EntityKind::Case)
        .identifiers(&["ContractID", "ClientID"])
        .textarea(&["Status"]);
    let options = FormOptions {
        adding: false,
        stay: true,
        authorized: is_admin,
    };
    let form = FieldForm::new(EntityKind::Case, row, spec, options);

    let by_case = Selector::eq("CaseNum", case.case_num.clone());
    let works: Vec<Work> = Repository::new(EntityKind::Work, store).select_any(by_case.clone()).await?;
    let work_rows = store.list(EntityKind::Work, by_case).await?;
    let columns = vec![
        ColumnSpec::new("Title"),
        ColumnSpec::new("Date").with_renderer(cells::date()),
        ColumnSpec::new("FeeAmt")
            .header("Fee")
            .with_renderer(cells::money())
            .filter_kind(FilterKind::NumericRange),
        actions_column(EntityKind::Work, is_admin),
    ];
    let works_table = Table::new(work_rows, columns)
        .id_column("WorkID")
        .page_size(5)
        .selector_highlight(false);
    let works_links = TableLinks::new(&path, &params, "works").no_select();

    let client_name = store
        .fetch(EntityKind::Client, &RecordId::Int(case.client_id))
        .await?
        .map(|c| display_row(EntityKind::Client, &c))
        .and_then(|c| c.get("Name").and_then(Value::as_str).map(str::to_string));

    let assigned: Vec<AssignedLawyer> = lawyers
        .iter()
        .map(|l| AssignedLawyer {
            id: l.lawyer_id,
            name: l.display_name(),
            email: l.email.clone(),
        })
        .collect();

    let mut context = page_context(&format!("Case {}", case.case_num), Some(ctx));
    context.insert("case_num", &case.case_num);
    context.insert("case_title", case.display_title());
    context.insert("client_id", &case.client_id);
    context.insert("client_name", &client_name);
    context.insert("lawyers", &assigned);
    context.insert("form", &form.view());
    context.insert("form_action", &format!("/record/case/{}", path_segment(&case.case_num)));
    context.insert("back", &path);
    context.insert("works", &render_table(works_table, &works_links));
    context.insert("can_add_work", &can_add_work(Some(ctx), &lawyer_ids));
    let case_param: String = form_urlencoded::byte_serialize(case.case_num.as_bytes()).collect();
    context.insert("add_work_href", &format!("/record/work/new?CaseNum={}", case_param));
    context.insert("total_billing", &format_php(total_billing(&works)));
    page("case.html", &context)
}
