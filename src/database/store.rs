//! Backend-agnostic record store.
//!
//! Controllers only see rows (`Row`) and the selectors below; the Postgres and
//! in-memory backends agree on coercion through `schema`.

use async_trait::async_trait;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::schema::{self, SchemaError};
use crate::types::{EntityKind, RecordId, Row};

/// Which rows of a table to list
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    All,
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Selector {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Selector::Eq(column.into(), value.into())
    }

    pub fn any_of(column: impl Into<String>, values: Vec<Value>) -> Self {
        Selector::In(column.into(), values)
    }

    /// Coerce the selector's values to the column type so `"1"` and `1` select the same rows
    pub fn normalize(self, kind: EntityKind) -> Result<Selector, DatabaseError> {
        // Selector values may be null even on required columns, or below zero on money columns
        let lookup = |name: &str| {
            schema::column(kind, name)
                .map(|def| schema::ColumnDef { nullable: true, non_negative: false, ..*def })
                .ok_or_else(|| SchemaError::UnknownColumn {
                    kind,
                    column: name.to_string(),
                })
        };
        Ok(match self {
            Selector::All => Selector::All,
            Selector::Eq(col, value) => {
                let value = schema::coerce_value(&lookup(&col)?, value)?;
                Selector::Eq(col, value)
            }
            Selector::In(col, values) => {
                let def = lookup(&col)?;
                let values = values
                    .into_iter()
                    .map(|v| schema::coerce_value(&def, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Selector::In(col, values)
            }
        })
    }

    /// In-process evaluation, used by the memory backend
    pub fn matches(&self, row: &Row) -> bool {
        let get = |col: &str| row.get(col).unwrap_or(&Value::Null);
        match self {
            Selector::All => true,
            Selector::Eq(col, value) => same_value(get(col), value),
            Selector::In(col, values) => values.iter().any(|v| same_value(get(col), v)),
        }
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn fetch(&self, kind: EntityKind, id: &RecordId) -> Result<Option<Row>, DatabaseError>;

    /// Rows ordered by primary key
    async fn list(&self, kind: EntityKind, selector: Selector) -> Result<Vec<Row>, DatabaseError>;

    /// Cases a lawyer is assigned to through `CaseLawyer`
    async fn cases_for_lawyer(&self, lawyer_id: i64) -> Result<Vec<Row>, DatabaseError>;

    /// Lawyers assigned to a case through `CaseLawyer`
    async fn lawyers_for_case(&self, case_num: &str) -> Result<Vec<Row>, DatabaseError>;

    /// Exact `user`/`pass` match against the Client or Lawyer table
    async fn find_by_credentials(
        &self,
        kind: EntityKind,
        user: &str,
        pass: &str,
    ) -> Result<Option<Row>, DatabaseError>;

    async fn create(&self, kind: EntityKind, record: Row) -> Result<Row, DatabaseError>;

    /// Full-record update by primary key; returns the stored snapshot
    async fn update(&self, kind: EntityKind, id: &RecordId, record: Row) -> Result<Row, DatabaseError>;

    /// Delete by primary key; returns the removed snapshot
    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<Row, DatabaseError>;

    async fn assign_lawyer(&self, case_num: &str, lawyer_id: i64) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Shared by both backends: coerce and drop the primary key for an update
pub(crate) fn prepare_update(kind: EntityKind, record: Row) -> Result<Row, DatabaseError> {
    let mut record = schema::coerce_record(kind, record)?;
    record.remove(kind.primary_key());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn normalizes_string_ids() {
        let sel = Selector::eq("ClientID", "7").normalize(EntityKind::Case).unwrap();
        assert_eq!(sel, Selector::Eq("ClientID".into(), json!(7)));
        assert!(sel.matches(&row(json!({"ClientID": 7}))));
        assert!(!sel.matches(&row(json!({"ClientID": 8}))));
    }

    #[test]
    fn rejects_unknown_selector_columns() {
        let err = Selector::eq("Nope", 1).normalize(EntityKind::Case).unwrap_err();
        assert!(matches!(err, DatabaseError::Schema(SchemaError::UnknownColumn { .. })));
    }

    #[test]
    fn membership_and_all() {
        let sel = Selector::any_of("CaseNum", vec![json!("C1"), json!("C3")]);
        assert!(sel.matches(&row(json!({"CaseNum": "C3"}))));
        assert!(!sel.matches(&row(json!({"CaseNum": "C2"}))));
        assert!(!Selector::any_of("CaseNum", vec![]).matches(&row(json!({"CaseNum": "C1"}))));
        assert!(Selector::All.matches(&Row::new()));
    }

    #[test]
    fn update_never_rewrites_the_key() {
        let prepared = prepare_update(EntityKind::Case, row(json!({"CaseNum": "C1", "Status": "Closed"}))).unwrap();
        assert!(prepared.get("CaseNum").is_none());
        assert_eq!(prepared["Status"], json!("Closed"));
    }
}
