use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::types::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Widget and predicate used for a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Text,
    NumericRange,
}

/// Active filter on one column; bounds are kept as typed so the form can echo them
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    Text(String),
    Range { min: String, max: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellAction {
    pub label: String,
    pub href: String,
    pub method: ActionMethod,
    /// Confirmation prompt shown before a POST action
    pub confirm: Option<String>,
}

impl CellAction {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: ActionMethod::Get,
            confirm: None,
        }
    }

    pub fn post(label: impl Into<String>, href: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            method: ActionMethod::Post,
            confirm: Some(confirm.into()),
        }
    }
}

/// Rendered content of one table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Cell {
    Text { text: String },
    Link { text: String, href: String },
    Actions { actions: Vec<CellAction> },
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text { text: text.into() }
    }

    pub fn empty() -> Self {
        Cell::Text { text: String::new() }
    }

    /// Plain text of the cell, as shown in CLI output
    pub fn plain(&self) -> String {
        match self {
            Cell::Text { text } | Cell::Link { text, .. } => text.clone(),
            Cell::Actions { actions } => actions
                .iter()
                .map(|a| a.label.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Cell renderer: receives the accessor value (null when missing) and the whole row
pub type CellRenderer = Arc<dyn Fn(&Value, &Row) -> Cell + Send + Sync>;

#[derive(Clone)]
pub struct ColumnSpec {
    pub key: String,
    pub header: Option<String>,
    pub renderer: Option<CellRenderer>,
    pub enable_sorting: bool,
    pub enable_column_filter: bool,
    pub filter_kind: Option<FilterKind>,
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: None,
            renderer: None,
            enable_sorting: true,
            enable_column_filter: true,
            filter_kind: None,
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn render(mut self, renderer: impl Fn(&Value, &Row) -> Cell + Send + Sync + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn no_sort(mut self) -> Self {
        self.enable_sorting = false;
        self
    }

    pub fn no_filter(mut self) -> Self {
        self.enable_column_filter = false;
        self
    }

    pub fn filter_kind(mut self, kind: FilterKind) -> Self {
        self.filter_kind = Some(kind);
        self
    }

    pub fn label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.key)
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("renderer", &self.renderer.is_some())
            .field("enable_sorting", &self.enable_sorting)
            .field("enable_column_filter", &self.enable_column_filter)
            .field("filter_kind", &self.filter_kind)
            .finish()
    }
}
