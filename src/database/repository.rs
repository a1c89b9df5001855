use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::store::{RecordStore, Selector};
use crate::types::{EntityKind, RecordId, Row};

/// Typed view over one table of a `RecordStore`
pub struct Repository<'a, T> {
    kind: EntityKind,
    store: &'a dyn RecordStore,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T> Repository<'a, T>
where
    T: DeserializeOwned,
{
    pub fn new(kind: EntityKind, store: &'a dyn RecordStore) -> Self {
        Self {
            kind,
            store,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, selector: Selector) -> Result<Vec<T>, DatabaseError> {
        self.store
            .list(self.kind, selector)
            .await?
            .into_iter()
            .map(|row| decode(self.kind, row))
            .collect()
    }

    pub async fn select_one(&self, id: &RecordId) -> Result<Option<T>, DatabaseError> {
        self.store
            .fetch(self.kind, id)
            .await?
            .map(|row| decode(self.kind, row))
            .transpose()
    }

    pub async fn select_404(&self, id: &RecordId) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(self.kind, id))
    }

    pub async fn select_ids(&self, ids: Vec<RecordId>) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let values = ids.iter().map(RecordId::to_value).collect();
        self.select_any(Selector::any_of(self.kind.primary_key(), values)).await
    }
}

/// Decode a JSON row into one of the typed models
pub fn decode<T: DeserializeOwned>(kind: EntityKind, row: Row) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| DatabaseError::QueryError(format!("decoding {} row: {}", kind, e)))
}
