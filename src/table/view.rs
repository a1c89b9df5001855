use serde::Serialize;
use serde_json::Value;

use super::filter::stringify;
use super::query::TableLinks;
use super::state::Table;
use super::types::{Cell, ColumnFilter, FilterKind, SortDirection};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterView {
    Text { name: String, value: String },
    Range { min_name: String, max_name: String, min: String, max: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderView {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
    pub sort_href: Option<String>,
    pub filter: Option<FilterView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub id: String,
    pub selected: bool,
    pub select_href: Option<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    /// One-based, for display
    pub page: usize,
    pub page_count: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub first_href: Option<String>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub last_href: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

/// Everything a template needs to draw one table
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub prefix: String,
    pub action: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub pagination: PaginationView,
    pub filtered_count: usize,
    pub total_count: usize,
    pub has_filters: bool,
    pub has_filter_row: bool,
    pub clear_href: String,
    pub hidden: Vec<HiddenField>,
}

impl Table {
    pub fn view(&self, links: &TableLinks) -> TableView {
        let headers: Vec<HeaderView> = self
            .columns()
            .iter()
            .map(|column| {
                let sort = self
                    .sort_state()
                    .filter(|(k, _)| *k == column.key)
                    .map(|(_, d)| d);
                let sort_href = self
                    .next_sort(&column.key)
                    .ok()
                    .map(|next| links.sort_href(&column.key, next));
                let filter = column.enable_column_filter.then(|| self.filter_view(&column.key, links));
                HeaderView {
                    key: column.key.clone(),
                    label: column.label().to_string(),
                    sortable: column.enable_sorting,
                    sort,
                    sort_href,
                    filter,
                }
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| {
                let id = stringify(&self.row_id(row));
                let cells = self
                    .columns()
                    .iter()
                    .map(|column| {
                        let value = row.get(&column.key).unwrap_or(&Value::Null);
                        match &column.renderer {
                            Some(render) => render(value, row),
                            None => Cell::text(stringify(value)),
                        }
                    })
                    .collect();
                RowView {
                    selected: self.is_selected(row),
                    select_href: links.select_href(&id),
                    id,
                    cells,
                }
            })
            .collect();

        let page = self.page_index();
        let last = self.page_count() - 1;
        let (can_previous, can_next) = (self.can_previous_page(), self.can_next_page());
        let pagination = PaginationView {
            page: page + 1,
            page_count: self.page_count(),
            can_previous,
            can_next,
            first_href: can_previous.then(|| links.page_href(0)),
            previous_href: can_previous.then(|| links.page_href(page - 1)),
            next_href: can_next.then(|| links.page_href(page + 1)),
            last_href: can_next.then(|| links.page_href(last)),
        };

        TableView {
            prefix: links.prefix.clone(),
            action: links.path.clone(),
            has_filter_row: headers.iter().any(|h| h.filter.is_some()),
            headers,
            rows,
            pagination,
            filtered_count: self.filtered_count(),
            total_count: self.rows().len(),
            has_filters: self.has_filters(),
            clear_href: links.clear_filters_href(),
            hidden: links
                .hidden_fields()
                .into_iter()
                .map(|(name, value)| HiddenField { name, value })
                .collect(),
        }
    }

    fn filter_view(&self, key: &str, links: &TableLinks) -> FilterView {
        match self.filter_kind(key) {
            FilterKind::Text => FilterView::Text {
                name: links.text_name(key),
                value: match self.filter_state(key) {
                    Some(ColumnFilter::Text(text)) => text.clone(),
                    _ => String::new(),
                },
            },
            FilterKind::NumericRange => {
                let (min, max) = match self.filter_state(key) {
                    Some(ColumnFilter::Range { min, max }) => (min.clone(), max.clone()),
                    _ => (String::new(), String::new()),
                };
                FilterView::Range {
                    min_name: links.min_name(key),
                    max_name: links.max_name(key),
                    min,
                    max,
                }
            }
        }
    }
}
