//! SQL generation for the Postgres backend.
//!
//! Every statement reads rows back as `row_to_json` so callers get the same
//! `Row` shape the memory backend produces. Values are bound as text and cast
//! per column, which keeps binding uniform across column types.

use serde_json::Value;
use sqlx::postgres::PgArguments;

use crate::database::manager::DatabaseError;
use crate::database::schema::{self, ColumnDef, SchemaError};
use crate::database::store::Selector;
use crate::types::{EntityKind, RecordId, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

pub struct QueryBuilder {
    kind: EntityKind,
    params: Vec<Value>,
}

impl QueryBuilder {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind, params: vec![] }
    }

    pub fn select(mut self, selector: &Selector) -> Result<SqlResult, DatabaseError> {
        let where_clause = self.where_clause(selector)?;
        let query = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE {} ORDER BY {}) t",
            self.table(),
            where_clause,
            quote(self.kind.primary_key()),
        );
        Ok(self.finish(query))
    }

    pub fn fetch(self, id: &RecordId) -> Result<SqlResult, DatabaseError> {
        let selector = Selector::Eq(self.kind.primary_key().to_string(), id.to_value());
        self.select(&selector)
    }

    pub fn insert(mut self, record: &Row) -> Result<SqlResult, DatabaseError> {
        let table = self.table();
        if record.is_empty() {
            let query = format!("INSERT INTO {} AS t DEFAULT VALUES RETURNING row_to_json(t) AS row", table);
            return Ok(self.finish(query));
        }

        let mut columns = Vec::with_capacity(record.len());
        let mut values = Vec::with_capacity(record.len());
        for (name, value) in record {
            let def = self.column(name)?;
            columns.push(quote(def.name));
            values.push(self.param(def, value.clone()));
        }
        let query = format!(
            "INSERT INTO {} AS t ({}) VALUES ({}) RETURNING row_to_json(t) AS row",
            table,
            columns.join(", "),
            values.join(", "),
        );
        Ok(self.finish(query))
    }

    /// `record` must already exclude the primary key
    pub fn update(mut self, id: &RecordId, record: &Row) -> Result<SqlResult, DatabaseError> {
        let mut assignments = Vec::with_capacity(record.len());
        for (name, value) in record {
            let def = self.column(name)?;
            let placeholder = self.param(def, value.clone());
            assignments.push(format!("{} = {}", quote(def.name), placeholder));
        }
        let pk = self.column(self.kind.primary_key())?;
        // A SET list cannot be empty; a no-op assignment still returns the row
        if assignments.is_empty() {
            assignments.push(format!("{0} = t.{0}", quote(pk.name)));
        }
        let key = self.param(pk, id.to_value());
        let query = format!(
            "UPDATE {} AS t SET {} WHERE t.{} = {} RETURNING row_to_json(t) AS row",
            self.table(),
            assignments.join(", "),
            quote(pk.name),
            key,
        );
        Ok(self.finish(query))
    }

    pub fn delete(mut self, id: &RecordId) -> Result<SqlResult, DatabaseError> {
        let pk = self.column(self.kind.primary_key())?;
        let key = self.param(pk, id.to_value());
        let query = format!(
            "DELETE FROM {} AS t WHERE t.{} = {} RETURNING row_to_json(t) AS row",
            self.table(),
            quote(pk.name),
            key,
        );
        Ok(self.finish(query))
    }

    fn where_clause(&mut self, selector: &Selector) -> Result<String, DatabaseError> {
        Ok(match selector {
            Selector::All => "1=1".to_string(),
            Selector::Eq(col, value) => {
                let def = self.column(col)?;
                if value.is_null() {
                    format!("{} IS NULL", quote(def.name))
                } else {
                    format!("{} = {}", quote(def.name), self.param(def, value.clone()))
                }
            }
            Selector::In(col, values) => {
                let def = self.column(col)?;
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(def, v.clone())).collect();
                format!("{} IN ({})", quote(def.name), params.join(", "))
            }
        })
    }

    fn column(&self, name: &str) -> Result<&'static ColumnDef, DatabaseError> {
        schema::column(self.kind, name).ok_or_else(|| {
            SchemaError::UnknownColumn { kind: self.kind, column: name.to_string() }.into()
        })
    }

    fn param(&mut self, def: &ColumnDef, value: Value) -> String {
        self.params.push(value);
        format!("CAST(${} AS {})", self.params.len(), def.sql_type.cast())
    }

    fn table(&self) -> String {
        quote(self.kind.table_name())
    }

    fn finish(self, query: String) -> SqlResult {
        SqlResult { query, params: self.params }
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Bind one parameter as text; the statement casts it to the column type
pub fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => q.bind(None::<String>),
        Value::String(s) => q.bind(Some(s.clone())),
        other => q.bind(Some(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_wraps_rows_as_json() {
        let sql = QueryBuilder::new(EntityKind::Case)
            .select(&Selector::eq("ClientID", 3))
            .unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"Case\" WHERE \"ClientID\" = CAST($1 AS integer) ORDER BY \"CaseNum\") t"
        );
        assert_eq!(sql.params, vec![json!(3)]);
    }

    #[test]
    fn empty_membership_selects_nothing() {
        let sql = QueryBuilder::new(EntityKind::Client)
            .select(&Selector::any_of("ClientID", vec![]))
            .unwrap();
        assert!(sql.query.contains("WHERE 1=0"));
        assert!(sql.params.is_empty());
    }

    #[test]
    fn null_equality_uses_is_null() {
        let sql = QueryBuilder::new(EntityKind::Work)
            .select(&Selector::eq("FeeAmt", Value::Null))
            .unwrap();
        assert!(sql.query.contains("\"FeeAmt\" IS NULL"));
    }

    #[test]
    fn update_casts_each_column_and_keys_last() {
        let record = json!({"Status": "Closed"}).as_object().cloned().unwrap();
        let sql = QueryBuilder::new(EntityKind::Case)
            .update(&RecordId::Text("C1".into()), &record)
            .unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"Case\" AS t SET \"Status\" = CAST($1 AS text) WHERE t.\"CaseNum\" = CAST($2 AS text) RETURNING row_to_json(t) AS row"
        );
        assert_eq!(sql.params, vec![json!("Closed"), json!("C1")]);
    }

    #[test]
    fn insert_without_columns_uses_defaults() {
        let sql = QueryBuilder::new(EntityKind::Contract).insert(&Row::new()).unwrap();
        assert!(sql.query.contains("DEFAULT VALUES"));
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let record = json!({"Bogus": 1}).as_object().cloned().unwrap();
        assert!(QueryBuilder::new(EntityKind::Work).insert(&record).is_err());
    }
}
