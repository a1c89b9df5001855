use axum::extract::{Path, RawQuery, State};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::app::AppState;
use crate::auth::access::{can_see_payments, client_list_scope, write_access, Access, ClientScope};
use crate::auth::AuthContext;
use crate::database::models::{Client, Contract};
use crate::database::repository::decode;
use crate::database::{Repository, Selector};
use crate::form::{FieldForm, FormOptions, FormSpec};
use crate::services::records::{int, RecordService};
use crate::table::filter::stringify;
use crate::table::query::path_segment;
use crate::table::{cells, Cell, CellAction, ColumnSpec, FilterKind, Table, TableLinks};
use crate::table::order::compare;
use crate::templates::{page, page_context, PageError, PageResult};
use crate::types::{EntityKind, RecordId, Row};

use super::{actions_column, display_row, parse_id, query_params, render_table, require_session};

#[derive(Debug, Serialize)]
struct SelectedClient {
    id: i64,
    name: String,
    email: String,
    phone: String,
    city: String,
}

#[derive(Debug, Serialize)]
struct ContractView {
    id: i64,
    terms: String,
    signed: String,
}

fn by_name(a: &Row, b: &Row) -> Ordering {
    compare(a.get("Name").unwrap_or(&Value::Null), b.get("Name").unwrap_or(&Value::Null))
}

fn client_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("Name"),
        ColumnSpec::new("Email"),
        ColumnSpec::new("CellNum").header("Cellphone"),
        ColumnSpec::new("CityAdd").header("City"),
    ]
}

fn case_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("CaseNum").header("Case Number"),
        ColumnSpec::new("Title"),
        ColumnSpec::new("Status"),
    ]
}

/// GET /client/all - clients selector, selected client's cases, and (admins) payments
pub async fn all_clients(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    let ctx = session.as_ref();
    let scope = client_list_scope(ctx).map_err(PageError::denied)?;
    let store = state.store();

    let (clients, lawyer_cases) = match scope {
        ClientScope::All => (store.list(EntityKind::Client, Selector::All).await?, None),
        ClientScope::OfLawyer(lawyer_id) => {
            let cases = store.cases_for_lawyer(lawyer_id).await?;
            let ids: Vec<Value> = cases.iter().filter_map(|c| int(c, "ClientID")).map(Value::from).collect();
            let clients = if ids.is_empty() {
                vec![]
            } else {
                store.list(EntityKind::Client, Selector::any_of("ClientID", ids)).await?
            };
            (clients, Some(cases))
        }
    };

    let mut rows: Vec<Row> = clients.iter().map(|c| display_row(EntityKind::Client, c)).collect();
    rows.sort_by(by_name);
    let names: HashMap<i64, Value> = rows
        .iter()
        .filter_map(|r| Some((int(r, "ClientID")?, r.get("Name")?.clone())))
        .collect();

    let params = query_params(raw);
    let picked: Arc<Mutex<Option<Value>>> = Arc::default();
    let sink = Arc::clone(&picked);
    let table = Table::new(rows, client_columns())
        .id_column("ClientID")
        .on_row_select(move |id| {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(id.clone());
            }
        });
    let clients_view = render_table(table, &TableLinks::new("/client/all", &params, "clients"));

    let selected_id = picked
        .lock()
        .ok()
        .and_then(|slot| slot.as_ref().and_then(|v| stringify(v).parse::<i64>().ok()));

    let mut context = page_context("Clients", ctx);
    context.insert("clients", &clients_view);

    if let Some(id) = selected_id {
        if let Some(row) = clients.iter().find(|c| int(c, "ClientID") == Some(id)) {
            let client: Client = decode(EntityKind::Client, row.clone())?;
            let cases = match &lawyer_cases {
                Some(cases) => cases.iter().filter(|c| int(c, "ClientID") == Some(id)).cloned().collect(),
                None => store.list(EntityKind::Case, Selector::eq("ClientID", id)).await?,
            };
            let cases_table = Table::new(cases, case_columns())
                .id_column("CaseNum")
                .selector_highlight(false);
            let cases_links = TableLinks::new("/client/all", &params, "cases").navigate("/case/{id}");
            context.insert("selected_cases", &render_table(cases_table, &cases_links));
            context.insert(
                "selected",
                &SelectedClient {
                    id,
                    name: client.display_name(),
                    email: client.email.clone().unwrap_or_default(),
                    phone: client.phone_line(),
                    city: client.city_add.clone().unwrap_or_default(),
                },
            );
        }
    }

    if can_see_payments(ctx) {
        let payments: Vec<Row> = store
            .list(EntityKind::Payment, Selector::All)
            .await?
            .into_iter()
            .map(|mut p| {
                let name = int(&p, "ClientID").and_then(|id| names.get(&id).cloned());
                p.insert("Client".to_string(), name.unwrap_or(Value::Null));
                p
            })
            .collect();
        let columns = vec![
            ColumnSpec::new("PaymentID").header("Reference Number").no_filter(),
            ColumnSpec::new("Client"),
            ColumnSpec::new("Amount")
                .with_renderer(cells::money())
                .filter_kind(FilterKind::NumericRange),
            ColumnSpec::new("Date").with_renderer(cells::date()),
        ];
        let table = Table::new(payments, columns).id_column("PaymentID").page_size(3);
        let links = TableLinks::new("/client/all", &params, "payments").navigate("/record/payment/{id}");
        context.insert("payments", &render_table(table, &links));
    }

    page("clients.html", &context)
}

/// GET /client/:id - client form, default contract, cases and payments
pub async fn client_page(
    State(state): State<AppState>,
    session: Option<AuthContext>,
    Path(raw_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> PageResult {
    let ctx = require_session(session.as_ref())?;
    let id = parse_id(EntityKind::Client, &raw_id)?;
    let store = state.store();
    let service = RecordService::new(store);

    let row = store
        .fetch(EntityKind::Client, &id)
        .await?
        .ok_or_else(|| PageError::NotFound(format!("Client {}", id)))?;
    PageError::check(service.access(Some(ctx), EntityKind::Client, &row).await?)?;

    let client: Client = decode(EntityKind::Client, row.clone())?;
    let client_id = client.client_id;
    let can_write = write_access(Some(ctx)) == Access::Allow;
    let params = query_params(raw);
    let path = format!("/client/{}", client_id);

    let spec = FormSpec::for_entity(EntityKind::Client).identifiers(&["ContractID"]);
    let options = FormOptions {
        adding: false,
        stay: true,
        authorized: can_write,
    };
    let form = FieldForm::new(EntityKind::Client, row, spec, options);

    let contract = match client.contract_id {
        Some(contract_id) => Repository::<Contract>::new(EntityKind::Contract, store)
            .select_one(&RecordId::Int(contract_id))
            .await?
            .map(|c| ContractView {
                id: c.contract_id,
                terms: c.terms.unwrap_or_default(),
                signed: c
                    .date_signed
                    .map(|d| d.format("%-m/%-d/%Y").to_string())
                    .unwrap_or_default(),
            }),
        None => None,
    };

    let mut cases = store.list(EntityKind::Case, Selector::eq("ClientID", client_id)).await?;
    if let Some(lawyer_id) = ctx.lawyer_id().filter(|_| !ctx.is_admin) {
        let assigned: Vec<Value> = store
            .cases_for_lawyer(lawyer_id)
            .await?
            .into_iter()
            .filter_map(|c| c.get("CaseNum").cloned())
            .collect();
        cases.retain(|c| c.get("CaseNum").map_or(false, |num| assigned.contains(num)));
    }
    let mut case_columns = case_columns();
    case_columns.push(ColumnSpec::new("Type"));
    case_columns.push(
        ColumnSpec::new("Actions")
            .no_sort()
            .no_filter()
            .render(move |_: &Value, row: &Row| Cell::Actions {
                actions: case_actions(row, can_write),
            }),
    );
    let cases_table = Table::new(cases, case_columns)
        .id_column("CaseNum")
        .selector_highlight(false);
    let cases_links = TableLinks::new(&path, &params, "cases").no_select();

    let payments = store.list(EntityKind::Payment, Selector::eq("ClientID", client_id)).await?;
    let mut payment_columns = vec![
        ColumnSpec::new("PaymentID").header("Reference Number").no_filter(),
        ColumnSpec::new("Amount")
            .with_renderer(cells::money())
            .filter_kind(FilterKind::NumericRange),
        ColumnSpec::new("Date").with_renderer(cells::date()),
    ];
    if can_write {
        payment_columns.push(actions_column(EntityKind::Payment, true));
    }
    let payments_table = Table::new(payments, payment_columns)
        .id_column("PaymentID")
        .selector_highlight(false);
    let payments_links = TableLinks::new(&path, &params, "payments").no_select();

    let mut context = page_context(&client.display_name(), Some(ctx));
    context.insert("client_name", &client.display_name());
    context.insert("form", &form.view());
    context.insert("form_action", &format!("/record/client/{}", client_id));
    context.insert("back", &path);
    context.insert("contract", &contract);
    context.insert("can_write", &can_write);
    context.insert("cases", &render_table(cases_table, &cases_links));
    context.insert("payments", &render_table(payments_table, &payments_links));
    context.insert(
        "add_case_href",
        &match client.contract_id {
            Some(contract_id) => format!("/record/case/new?ClientID={}&ContractID={}", client_id, contract_id),
            None => format!("/record/case/new?ClientID={}", client_id),
        },
    );
    context.insert("add_payment_href", &format!("/record/payment/new?ClientID={}", client_id));
    page("client.html", &context)
}

/// View always; Delete for admins
fn case_actions(row: &Row, can_delete: bool) -> Vec<CellAction> {
    let Some(num) = row.get("CaseNum").map(stringify).filter(|s| !s.is_empty()) else {
        return vec![];
    };
    let segment = path_segment(&num);
    let mut actions = vec![CellAction::link("View", format!("/case/{}", segment))];
    if can_delete {
        actions.push(CellAction::post(
            "Delete",
            format!("/record/case/{}/delete", segment),
            format!("Delete case {}?", num),
        ));
    }
    actions
}
