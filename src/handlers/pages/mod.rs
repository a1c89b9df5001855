// handlers/pages/mod.rs - server-rendered pages
//
// Every page checks the session before it reads anything gated, so an
// anonymous visitor is redirected without a dataset ever being fetched.

pub mod cases;
pub mod clients;
pub mod home;
pub mod lawyers;
pub mod records;

use serde_json::Value;
use url::form_urlencoded;

use crate::auth::AuthContext;
use crate::database::models::display_name;
use crate::database::schema::without_secrets;
use crate::table::{Cell, CellAction, ColumnSpec, Table, TableLinks, TableQuery, TableView};
use crate::table::query::path_segment;
use crate::templates::PageError;
use crate::types::{EntityKind, RecordId, Row};

pub(crate) fn query_params(raw: Option<String>) -> Vec<(String, String)> {
    raw.map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Restore a table's URL state and build its view
pub(crate) fn render_table(mut table: Table, links: &TableLinks) -> TableView {
    TableQuery::from_params(&links.prefix, &links.params).apply(&mut table);
    table.view(links)
}

pub(crate) fn require_session(session: Option<&AuthContext>) -> Result<&AuthContext, PageError> {
    session.ok_or(PageError::Login)
}

pub(crate) fn parse_id(kind: EntityKind, raw: &str) -> Result<RecordId, PageError> {
    kind.parse_id(raw)
        .map_err(|_| PageError::NotFound(format!("{} {}", kind.label(), raw)))
}

/// Row for display: credentials dropped, `Name` added for people
pub(crate) fn display_row(kind: EntityKind, row: &Row) -> Row {
    let mut row = without_secrets(kind, row);
    if matches!(kind, EntityKind::Client | EntityKind::Lawyer) {
        let field = |key: &str| row.get(key).and_then(Value::as_str);
        let name = display_name(field("LastName"), field("FirstName"), field("MiddleName"));
        row.insert("Name".to_string(), Value::String(name));
    }
    row
}

/// Edit/Delete buttons for admins, a View link for everyone else
pub(crate) fn actions_column(kind: EntityKind, is_admin: bool) -> ColumnSpec {
    ColumnSpec::new("Actions").no_sort().no_filter().render(move |_: &Value, row: &Row| {
        let Some(id) = kind.id_of(row) else {
            return Cell::empty();
        };
        let href = format!("/record/{}/{}", kind, path_segment(&id.to_string()));
        let actions = if is_admin {
            vec![
                CellAction::link("Edit", href.clone()),
                CellAction::post("Delete", format!("{}/delete", href), format!("Delete {} {}?", kind.label(), id)),
            ]
        } else {
            vec![CellAction::link("View", href)]
        };
        Cell::Actions { actions }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_rows_gain_a_name_and_lose_credentials() {
        let row = json!({"ClientID": 1, "LastName": "Santos", "FirstName": "Amy", "MiddleName": "Cruz", "pass": "amy123"});
        let row = display_row(EntityKind::Client, row.as_object().unwrap());
        assert_eq!(row["Name"], "Santos, Amy Cruz");
        assert!(!row.contains_key("pass"));
    }

    #[test]
    fn parses_query_strings() {
        let params = query_params(Some("cases.sort=Title&cases.f.Status=Open%20now".into()));
        assert_eq!(params[1], ("cases.f.Status".to_string(), "Open now".to_string()));
        assert!(query_params(None).is_empty());
    }

    #[test]
    fn actions_depend_on_role() {
        let row = json!({"WorkID": 7});
        let row = row.as_object().unwrap();
        let admin = actions_column(EntityKind::Work, true);
        let render = admin.renderer.as_ref().unwrap();
        match render(&Value::Null, row) {
            Cell::Actions { actions } => {
                assert_eq!(actions[0].href, "/record/work/7");
                assert_eq!(actions[1].href, "/record/work/7/delete");
            }
            other => panic!("unexpected cell {:?}", other),
        }

        let viewer = actions_column(EntityKind::Work, false);
        let render = viewer.renderer.as_ref().unwrap();
        assert_eq!(render(&Value::Null, row).plain(), "View");
    }
}
