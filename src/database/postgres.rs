use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row as _};
use tracing::{debug, warn};

use crate::config::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::{bind_param, QueryBuilder, SqlResult};
use crate::database::schema;
use crate::database::store::{prepare_update, RecordStore, Selector};
use crate::types::{EntityKind, RecordId, Row};

/// `RecordStore` over the Postgres practice database
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect through the shared `DatabaseManager` pool
    pub async fn connect() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, sql: SqlResult) -> Result<Vec<Row>, DatabaseError> {
        if config().database.enable_query_logging {
            debug!(query = %sql.query, params = sql.params.len(), "sql");
        }
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(json_row).collect()
    }

    async fn fetch_optional(&self, sql: SqlResult) -> Result<Option<Row>, DatabaseError> {
        Ok(self.fetch_rows(sql).await?.into_iter().next())
    }

    async fn write(&self, kind: EntityKind, id: String, sql: SqlResult) -> Result<Row, DatabaseError> {
        match self.fetch_optional(sql).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(DatabaseError::NotFound { kind, id }),
            Err(DatabaseError::Sqlx(sqlx::Error::Database(db))) if db.is_unique_violation() => {
                warn!("Duplicate {} {}", kind, id);
                Err(DatabaseError::Conflict { kind, id })
            }
            Err(other) => Err(other),
        }
    }
}

impl PgStore {
    /// Move the identity sequence past explicitly inserted keys (seeding)
    async fn sync_identity(&self, kind: EntityKind) -> Result<(), DatabaseError> {
        let query = format!(
            "SELECT setval(pg_get_serial_sequence('\"{table}\"', '{pk}'), GREATEST((SELECT MAX(\"{pk}\") FROM \"{table}\"), 1))",
            table = kind.table_name(),
            pk = kind.primary_key(),
        );
        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }
}

fn json_row(row: &sqlx::postgres::PgRow) -> Result<Row, DatabaseError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("expected JSON object row, got {}", other))),
    }
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch(&self, kind: EntityKind, id: &RecordId) -> Result<Option<Row>, DatabaseError> {
        self.fetch_optional(QueryBuilder::new(kind).fetch(id)?).await
    }

    async fn list(&self, kind: EntityKind, selector: Selector) -> Result<Vec<Row>, DatabaseError> {
        let selector = selector.normalize(kind)?;
        self.fetch_rows(QueryBuilder::new(kind).select(&selector)?).await
    }

    async fn cases_for_lawyer(&self, lawyer_id: i64) -> Result<Vec<Row>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT row_to_json(t) AS row FROM (
                SELECT c.* FROM \"Case\" c
                JOIN \"CaseLawyer\" cl ON cl.\"CaseNum\" = c.\"CaseNum\"
                WHERE cl.\"LawyerID\" = $1
                ORDER BY c.\"CaseNum\"
             ) t",
        )
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(json_row).collect()
    }

    async fn lawyers_for_case(&self, case_num: &str) -> Result<Vec<Row>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT row_to_json(t) AS row FROM (
                SELECT l.* FROM \"Lawyer\" l
                JOIN \"CaseLawyer\" cl ON cl.\"LawyerID\" = l.\"LawyerID\"
                WHERE cl.\"CaseNum\" = $1
                ORDER BY l.\"LawyerID\"
             ) t",
        )
        .bind(case_num)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(json_row).collect()
    }

    async fn find_by_credentials(
        &self,
        kind: EntityKind,
        user: &str,
        pass: &str,
    ) -> Result<Option<Row>, DatabaseError> {
        if !matches!(kind, EntityKind::Client | EntityKind::Lawyer) {
            return Ok(None);
        }
        let query = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{}\" WHERE \"user\" = $1 AND \"pass\" = $2 LIMIT 1) t",
            kind.table_name()
        );
        let row = sqlx::query(&query)
            .bind(user)
            .bind(pass)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(json_row).transpose()
    }

    async fn create(&self, kind: EntityKind, record: Row) -> Result<Row, DatabaseError> {
        let record = schema::coerce_record(kind, record)?;
        let explicit_id = kind.id_of(&record);
        let id = explicit_id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "(new)".to_string());
        let row = self.write(kind, id, QueryBuilder::new(kind).insert(&record)?).await?;
        if explicit_id.is_some() && !kind.has_text_key() {
            self.sync_identity(kind).await?;
        }
        Ok(row)
    }

    async fn update(&self, kind: EntityKind, id: &RecordId, record: Row) -> Result<Row, DatabaseError> {
        let record = prepare_update(kind, record)?;
        self.write(kind, id.to_string(), QueryBuilder::new(kind).update(id, &record)?).await
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<Row, DatabaseError> {
        self.write(kind, id.to_string(), QueryBuilder::new(kind).delete(id)?).await
    }

    async fn assign_lawyer(&self, case_num: &str, lawyer_id: i64) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO \"CaseLawyer\" (\"CaseNum\", \"LawyerID\") VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(case_num)
        .bind(lawyer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
