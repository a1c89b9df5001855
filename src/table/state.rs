use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::config;
use crate::types::Row;

use super::error::TableError;
use super::filter::{infer_kind, stringify};
use super::order::compare_directed;
use super::types::{ColumnFilter, ColumnSpec, FilterKind, SortDirection};

/// Invoked with the selected row's identifier
pub type RowSelectCallback = Box<dyn FnMut(&Value) + Send>;

/// Client-side style table over an in-memory row set: filter, then sort, then paginate.
///
/// All state (filters, sort, page, selection) lives for one request; the
/// server carries it between requests through `TableQuery`.
pub struct Table {
    rows: Vec<Row>,
    columns: Vec<ColumnSpec>,
    page_size: usize,
    page_index: usize,
    sort: Option<(String, SortDirection)>,
    filters: BTreeMap<String, ColumnFilter>,
    on_row_select: Option<RowSelectCallback>,
    selector_highlight: bool,
    id_column: Option<String>,
    selected: Option<Value>,
}

impl Table {
    pub fn new(rows: Vec<Row>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            rows,
            columns,
            page_size: config().table.default_page_size.max(1),
            page_index: 0,
            sort: None,
            filters: BTreeMap::new(),
            on_row_select: None,
            selector_highlight: true,
            id_column: None,
            selected: None,
        }
    }

    /// Rows per page, capped by the configured maximum
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, config().table.max_page_size.max(1));
        self
    }

    pub fn on_row_select(mut self, callback: impl FnMut(&Value) + Send + 'static) -> Self {
        self.on_row_select = Some(Box::new(callback));
        self
    }

    pub fn selector_highlight(mut self, enabled: bool) -> Self {
        self.selector_highlight = enabled;
        self
    }

    pub fn id_column(mut self, key: impl Into<String>) -> Self {
        self.id_column = Some(key.into());
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn max_page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index.min(self.page_count() - 1)
    }

    pub fn sort_state(&self) -> Option<(&str, SortDirection)> {
        self.sort.as_ref().map(|(k, d)| (k.as_str(), *d))
    }

    pub fn filter_state(&self, key: &str) -> Option<&ColumnFilter> {
        self.filters.get(key)
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn selected(&self) -> Option<&Value> {
        self.selected.as_ref()
    }

    fn column(&self, key: &str) -> Result<&ColumnSpec, TableError> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| TableError::UnknownColumn(key.to_string()))
    }

    /// Explicit kind when configured, otherwise inferred from the first unfiltered row
    pub fn filter_kind(&self, key: &str) -> FilterKind {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .and_then(|c| c.filter_kind)
            .unwrap_or_else(|| infer_kind(self.rows.first().and_then(|r| r.get(key))))
    }

    fn filterable(&self, key: &str, expected: FilterKind) -> Result<(), TableError> {
        let column = self.column(key)?;
        if !column.enable_column_filter {
            return Err(TableError::FilteringDisabled(key.to_string()));
        }
        let actual = self.filter_kind(key);
        if actual != expected {
            return Err(TableError::FilterKindMismatch { column: key.to_string(), expected: actual });
        }
        Ok(())
    }

    fn store_filter(&mut self, key: &str, filter: ColumnFilter) {
        if filter.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), filter);
        }
        self.page_index = 0;
    }

    pub fn set_text_filter(&mut self, key: &str, text: impl Into<String>) -> Result<(), TableError> {
        self.filterable(key, FilterKind::Text)?;
        self.store_filter(key, ColumnFilter::Text(text.into()));
        Ok(())
    }

    pub fn set_range_min(&mut self, key: &str, raw: impl Into<String>) -> Result<(), TableError> {
        self.set_range_bound(key, Some(raw.into()), None)
    }

    pub fn set_range_max(&mut self, key: &str, raw: impl Into<String>) -> Result<(), TableError> {
        self.set_range_bound(key, None, Some(raw.into()))
    }

    fn set_range_bound(&mut self, key: &str, min: Option<String>, max: Option<String>) -> Result<(), TableError> {
        self.filterable(key, FilterKind::NumericRange)?;
        let (old_min, old_max) = match self.filters.get(key) {
            Some(ColumnFilter::Range { min, max }) => (min.clone(), max.clone()),
            _ => (String::new(), String::new()),
        };
        let filter = ColumnFilter::Range {
            min: min.unwrap_or(old_min),
            max: max.unwrap_or(old_max),
        };
        self.store_filter(key, filter);
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page_index = 0;
    }

    /// unsorted -> asc -> desc -> unsorted; sorting by a new column starts at asc
    pub fn toggle_sort(&mut self, key: &str) -> Result<Option<SortDirection>, TableError> {
        let next = self.next_sort(key)?;
        self.sort = next.map(|d| (key.to_string(), d));
        self.page_index = 0;
        Ok(next)
    }

    /// State `toggle_sort` would move to, without changing anything
    pub fn next_sort(&self, key: &str) -> Result<Option<SortDirection>, TableError> {
        if !self.column(key)?.enable_sorting {
            return Err(TableError::SortingDisabled(key.to_string()));
        }
        Ok(match &self.sort {
            Some((k, SortDirection::Asc)) if k == key => Some(SortDirection::Desc),
            Some((k, SortDirection::Desc)) if k == key => None,
            _ => Some(SortDirection::Asc),
        })
    }

    /// Set the sort directly (used when restoring state from a URL)
    pub fn set_sort(&mut self, key: &str, direction: Option<SortDirection>) -> Result<(), TableError> {
        if !self.column(key)?.enable_sorting {
            return Err(TableError::SortingDisabled(key.to_string()));
        }
        self.sort = direction.map(|d| (key.to_string(), d));
        self.page_index = 0;
        Ok(())
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.rows
            .iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|(key, f)| f.matches(row.get(key).unwrap_or(&Value::Null)))
            })
            .collect()
    }

    /// Filtered rows in sort order; the sort is stable
    pub fn sorted_rows(&self) -> Vec<&Row> {
        let mut rows = self.filtered_rows();
        if let Some((key, dir)) = &self.sort {
            rows.sort_by(|a, b| {
                compare_directed(
                    a.get(key).unwrap_or(&Value::Null),
                    b.get(key).unwrap_or(&Value::Null),
                    *dir,
                )
            });
        }
        rows
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_rows().len()
    }

    /// At least one page, even when nothing matches
    pub fn page_count(&self) -> usize {
        self.filtered_count().div_ceil(self.page_size).max(1)
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        let start = self.page_index() * self.page_size;
        self.sorted_rows().into_iter().skip(start).take(self.page_size).collect()
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index() > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index() + 1 < self.page_count()
    }

    pub fn set_page(&mut self, index: usize) {
        self.page_index = index.min(self.page_count() - 1);
    }

    pub fn first_page(&mut self) {
        self.set_page(0);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page_index().saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page_index() + 1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.page_count() - 1);
    }

    /// Configured id column, else `id` when present, else the first column
    pub fn id_key(&self) -> Option<&str> {
        if let Some(key) = &self.id_column {
            return Some(key.as_str());
        }
        let has_id = self.columns.iter().any(|c| c.key == "id")
            || self.rows.first().map_or(false, |r| r.contains_key("id"));
        if has_id {
            return Some("id");
        }
        self.columns.first().map(|c| c.key.as_str())
    }

    pub fn row_id(&self, row: &Row) -> Value {
        self.id_key()
            .and_then(|k| row.get(k))
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn is_selected(&self, row: &Row) -> bool {
        self.selector_highlight && self.selected.as_ref() == Some(&self.row_id(row))
    }

    /// Select a row of the current page; fires the callback exactly once
    pub fn select_row(&mut self, index: usize) -> Result<Value, TableError> {
        let id = {
            let page = self.page_rows();
            let row = page
                .get(index)
                .ok_or(TableError::RowOutOfRange { index, len: page.len() })?;
            self.row_id(row)
        };
        self.mark_selected(id.clone());
        Ok(id)
    }

    /// Select by identifier (string form), anywhere in the row set
    pub fn select_id(&mut self, raw: &str) -> Option<Value> {
        let id = self
            .rows
            .iter()
            .map(|r| self.row_id(r))
            .find(|id| !id.is_null() && stringify(id) == raw)?;
        self.mark_selected(id.clone());
        Some(id)
    }

    fn mark_selected(&mut self, id: Value) {
        if let Some(callback) = self.on_row_select.as_mut() {
            callback(&id);
        }
        if self.selector_highlight {
            self.selected = Some(id);
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("page_size", &self.page_size)
            .field("page_index", &self.page_index)
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("selected", &self.selected)
            .finish()
    }
}
