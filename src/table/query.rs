//! Table state carried in the page URL.
//!
//! Every table on a page owns a prefix, so `cases.sort=Title&works.page=2`
//! drives two tables independently. Unknown columns and malformed values are
//! ignored rather than reported.

use std::collections::BTreeMap;
use tracing::debug;
use url::form_urlencoded;

use super::state::Table;
use super::types::SortDirection;

const SORT: &str = "sort";
const DIR: &str = "dir";
const PAGE: &str = "page";
const SELECTED: &str = "sel";
const TEXT: &str = "f.";
const MIN: &str = "min.";
const MAX: &str = "max.";

pub fn param_name(prefix: &str, name: &str) -> String {
    format!("{}.{}", prefix, name)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub sort: Option<(String, SortDirection)>,
    /// Zero-based; the URL carries it one-based
    pub page: Option<usize>,
    pub text: BTreeMap<String, String>,
    pub min: BTreeMap<String, String>,
    pub max: BTreeMap<String, String>,
    pub selected: Option<String>,
}

impl TableQuery {
    pub fn from_params(prefix: &str, params: &[(String, String)]) -> Self {
        let head = format!("{}.", prefix);
        let mut query = TableQuery::default();
        let mut sort_key = None;
        let mut direction = None;

        for (name, value) in params {
            let Some(rest) = name.strip_prefix(&head) else {
                continue;
            };
            if let Some(col) = rest.strip_prefix(TEXT) {
                query.text.insert(col.to_string(), value.clone());
            } else if let Some(col) = rest.strip_prefix(MIN) {
                query.min.insert(col.to_string(), value.clone());
            } else if let Some(col) = rest.strip_prefix(MAX) {
                query.max.insert(col.to_string(), value.clone());
            } else {
                match rest {
                    SORT if !value.trim().is_empty() => sort_key = Some(value.clone()),
                    DIR => direction = SortDirection::parse(value),
                    PAGE => {
                        query.page = value
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .map(|p| p.saturating_sub(1))
                    }
                    SELECTED if !value.is_empty() => query.selected = Some(value.clone()),
                    _ => {}
                }
            }
        }

        query.sort = sort_key.map(|k| (k, direction.unwrap_or(SortDirection::Asc)));
        query
    }

    pub fn from_query_string(prefix: &str, raw: &str) -> Self {
        let params: Vec<(String, String)> = form_urlencoded::parse(raw.as_bytes()).into_owned().collect();
        Self::from_params(prefix, &params)
    }

    /// Restore the state onto a table: filters, then sort, then page, then selection
    pub fn apply(&self, table: &mut Table) {
        for (col, text) in &self.text {
            if let Err(e) = table.set_text_filter(col, text.clone()) {
                debug!("Ignoring text filter: {}", e);
            }
        }
        for (col, raw) in &self.min {
            if let Err(e) = table.set_range_min(col, raw.clone()) {
                debug!("Ignoring range filter: {}", e);
            }
        }
        for (col, raw) in &self.max {
            if let Err(e) = table.set_range_max(col, raw.clone()) {
                debug!("Ignoring range filter: {}", e);
            }
        }
        if let Some((col, dir)) = &self.sort {
            if let Err(e) = table.set_sort(col, Some(*dir)) {
                debug!("Ignoring sort: {}", e);
            }
        }
        if let Some(page) = self.page {
            table.set_page(page);
        }
        if let Some(id) = &self.selected {
            if table.select_id(id).is_none() {
                debug!("Ignoring selection of unknown row {}", id);
            }
        }
    }
}

/// How clicking a row behaves
#[derive(Debug, Clone, PartialEq)]
pub enum SelectLink {
    None,
    /// Re-render the page with `<prefix>.sel=<id>`
    Query,
    /// Navigate to a path; `{id}` is replaced by the row identifier
    Navigate(String),
}

/// Builds links that change one table's state while keeping the rest of the URL
#[derive(Debug, Clone)]
pub struct TableLinks {
    pub path: String,
    pub params: Vec<(String, String)>,
    pub prefix: String,
    pub select: SelectLink,
}

impl TableLinks {
    pub fn new(path: impl Into<String>, params: &[(String, String)], prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: params.to_vec(),
            prefix: prefix.into(),
            select: SelectLink::Query,
        }
    }

    pub fn navigate(mut self, template: impl Into<String>) -> Self {
        self.select = SelectLink::Navigate(template.into());
        self
    }

    pub fn no_select(mut self) -> Self {
        self.select = SelectLink::None;
        self
    }

    pub fn name(&self, name: &str) -> String {
        param_name(&self.prefix, name)
    }

    pub fn text_name(&self, col: &str) -> String {
        self.name(&format!("{}{}", TEXT, col))
    }

    pub fn min_name(&self, col: &str) -> String {
        self.name(&format!("{}{}", MIN, col))
    }

    pub fn max_name(&self, col: &str) -> String {
        self.name(&format!("{}{}", MAX, col))
    }

    fn is_filter_param(&self, name: &str) -> bool {
        let head = format!("{}.", self.prefix);
        name.strip_prefix(&head)
            .map(|rest| rest.starts_with(TEXT) || rest.starts_with(MIN) || rest.starts_with(MAX))
            .unwrap_or(false)
    }

    /// Current URL minus params matching `drop`, plus `set`
    fn href(&self, drop: impl Fn(&str) -> bool, set: &[(String, String)]) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.params {
            if drop(name) || set.iter().any(|(n, _)| n == name) {
                continue;
            }
            out.append_pair(name, value);
        }
        for (name, value) in set {
            out.append_pair(name, value);
        }
        let query = out.finish();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    pub fn sort_href(&self, col: &str, next: Option<SortDirection>) -> String {
        let (sort, dir, page) = (self.name(SORT), self.name(DIR), self.name(PAGE));
        let drop = |n: &str| n == sort || n == dir || n == page;
        match next {
            Some(d) => self.href(drop, &[(sort.clone(), col.to_string()), (dir.clone(), d.as_str().to_string())]),
            None => self.href(drop, &[]),
        }
    }

    /// Link to a zero-based page
    pub fn page_href(&self, page: usize) -> String {
        self.href(|_| false, &[(self.name(PAGE), (page + 1).to_string())])
    }

    pub fn clear_filters_href(&self) -> String {
        let page = self.name(PAGE);
        self.href(|n| n == page || self.is_filter_param(n), &[])
    }

    pub fn select_href(&self, id: &str) -> Option<String> {
        match &self.select {
            SelectLink::None => None,
            SelectLink::Query => Some(self.href(|_| false, &[(self.name(SELECTED), id.to_string())])),
            SelectLink::Navigate(template) => Some(template.replace("{id}", &path_segment(id))),
        }
    }

    /// Params the filter form must carry along so other state survives a submit
    pub fn hidden_fields(&self) -> Vec<(String, String)> {
        let page = self.name(PAGE);
        self.params
            .iter()
            .filter(|(n, _)| *n != page && !self.is_filter_param(n))
            .cloned()
            .collect()
    }
}

/// Percent-encode one path segment
pub fn path_segment(raw: &str) -> String {
    let mut url = match url::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
    }

    #[test]
    fn parses_prefixed_state_only() {
        let q = TableQuery::from_query_string(
            "works",
            "works.sort=Date&works.dir=desc&works.page=2&works.f.Title=Court&works.min.FeeAmt=10&cases.page=9&works.sel=3",
        );
        assert_eq!(q.sort, Some(("Date".into(), SortDirection::Desc)));
        assert_eq!(q.page, Some(1));
        assert_eq!(q.text.get("Title").map(String::as_str), Some("Court"));
        assert_eq!(q.min.get("FeeAmt").map(String::as_str), Some("10"));
        assert_eq!(q.selected.as_deref(), Some("3"));
    }

    #[test]
    fn malformed_values_are_unset() {
        let q = TableQuery::from_query_string("t", "t.page=abc&t.sort=&t.dir=sideways");
        assert_eq!(q, TableQuery::default());

        let q = TableQuery::from_query_string("t", "t.sort=Name&t.dir=sideways");
        assert_eq!(q.sort, Some(("Name".into(), SortDirection::Asc)));
    }

    #[test]
    fn links_keep_other_tables_state() {
        let links = TableLinks::new("/case/C1", &params("cases.page=2&works.page=3&works.f.Title=a"), "works");
        assert_eq!(links.page_href(0), "/case/C1?cases.page=2&works.f.Title=a&works.page=1");
        assert_eq!(
            links.sort_href("Date", Some(SortDirection::Asc)),
            "/case/C1?cases.page=2&works.f.Title=a&works.sort=Date&works.dir=asc"
        );
        assert_eq!(links.clear_filters_href(), "/case/C1?cases.page=2");
        assert_eq!(links.hidden_fields(), params("cases.page=2"));
    }

    #[test]
    fn select_links() {
        let links = TableLinks::new("/client/all", &[], "clients");
        assert_eq!(links.select_href("4").as_deref(), Some("/client/all?clients.sel=4"));
        let links = links.navigate("/case/{id}");
        assert_eq!(links.select_href("C 1/2").as_deref(), Some("/case/C%201%2F2"));
        assert_eq!(links.no_select().select_href("4"), None);
    }
}
