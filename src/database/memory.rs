use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::schema;
use crate::database::store::{prepare_update, RecordStore, Selector};
use crate::types::{EntityKind, RecordId, Row};

type Table = BTreeMap<RecordId, Row>;

/// `RecordStore` kept in process memory; used for demos and tests
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityKind, Table>>,
    assignments: RwLock<BTreeSet<(String, i64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(table: &Table) -> i64 {
        table
            .keys()
            .filter_map(|k| match k {
                RecordId::Int(i) => Some(*i),
                RecordId::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    async fn rows_by_key(&self, kind: EntityKind, keys: &[RecordId]) -> Vec<Row> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&kind) else {
            return vec![];
        };
        keys.iter().filter_map(|k| table.get(k).cloned()).collect()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, kind: EntityKind, id: &RecordId) -> Result<Option<Row>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&kind).and_then(|t| t.get(id)).cloned())
    }

    async fn list(&self, kind: EntityKind, selector: Selector) -> Result<Vec<Row>, DatabaseError> {
        let selector = selector.normalize(kind)?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(&kind)
            .map(|t| t.values().filter(|r| selector.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn cases_for_lawyer(&self, lawyer_id: i64) -> Result<Vec<Row>, DatabaseError> {
        let keys: Vec<RecordId> = self
            .assignments
            .read()
            .await
            .iter()
            .filter(|(_, l)| *l == lawyer_id)
            .map(|(case_num, _)| RecordId::Text(case_num.clone()))
            .collect();
        Ok(self.rows_by_key(EntityKind::Case, &keys).await)
    }

    async fn lawyers_for_case(&self, case_num: &str) -> Result<Vec<Row>, DatabaseError> {
        let mut keys: Vec<RecordId> = self
            .assignments
            .read()
            .await
            .iter()
            .filter(|(c, _)| c == case_num)
            .map(|(_, lawyer_id)| RecordId::Int(*lawyer_id))
            .collect();
        keys.sort();
        Ok(self.rows_by_key(EntityKind::Lawyer, &keys).await)
    }

    async fn find_by_credentials(
        &self,
        kind: EntityKind,
        user: &str,
        pass: &str,
    ) -> Result<Option<Row>, DatabaseError> {
        let tables = self.tables.read().await;
        let matches = |row: &&Row| {
            row.get("user").and_then(Value::as_str) == Some(user)
                && row.get("pass").and_then(Value::as_str) == Some(pass)
        };
        Ok(tables.get(&kind).and_then(|t| t.values().find(matches)).cloned())
    }

    async fn create(&self, kind: EntityKind, record: Row) -> Result<Row, DatabaseError> {
        let mut record = schema::coerce_record(kind, record)?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(kind).or_default();

        let id = match kind.id_of(&record) {
            Some(id) => id,
            None if kind.has_text_key() => {
                return Err(schema::SchemaError::Required(kind.primary_key().to_string()).into())
            }
            None => {
                let id = Self::next_id(table);
                record.insert(kind.primary_key().to_string(), Value::from(id));
                RecordId::Int(id)
            }
        };
        if table.contains_key(&id) {
            return Err(DatabaseError::Conflict { kind, id: id.to_string() });
        }

        // Columns the caller left out are stored as null, like a fresh SQL row
        for def in schema::columns(kind) {
            record.entry(def.name.to_string()).or_insert(Value::Null);
        }
        table.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, record: Row) -> Result<Row, DatabaseError> {
        let record = prepare_update(kind, record)?;
        let mut tables = self.tables.write().await;
        let existing = tables
            .get_mut(&kind)
            .and_then(|t| t.get_mut(id))
            .ok_or_else(|| DatabaseError::not_found(kind, id))?;
        for (k, v) in record {
            existing.insert(k, v);
        }
        Ok(existing.clone())
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<Row, DatabaseError> {
        let removed = self
            .tables
            .write()
            .await
            .get_mut(&kind)
            .and_then(|t| t.remove(id))
            .ok_or_else(|| DatabaseError::not_found(kind, id))?;
        if let RecordId::Text(case_num) = id {
            if kind == EntityKind::Case {
                self.assignments.write().await.retain(|(c, _)| c != case_num);
            }
        }
        if let (EntityKind::Lawyer, RecordId::Int(lawyer_id)) = (kind, id) {
            self.assignments.write().await.retain(|(_, l)| l != lawyer_id);
        }
        Ok(removed)
    }

    async fn assign_lawyer(&self, case_num: &str, lawyer_id: i64) -> Result<(), DatabaseError> {
        if self.fetch(EntityKind::Case, &RecordId::Text(case_num.to_string())).await?.is_none() {
            return Err(DatabaseError::not_found(EntityKind::Case, case_num));
        }
        if self.fetch(EntityKind::Lawyer, &RecordId::Int(lawyer_id)).await?.is_none() {
            return Err(DatabaseError::not_found(EntityKind::Lawyer, lawyer_id));
        }
        self.assignments.write().await.insert((case_num.to_string(), lawyer_id));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
