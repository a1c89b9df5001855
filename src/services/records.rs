// services/records.rs - record mutations and per-record visibility
//
// Pages, form posts and the JSON API all write through `RecordService`, so a
// mutation is logged the same way whichever surface issued it.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::access::{self, Access, AuthContext};
use crate::database::schema::without_secrets;
use crate::database::{DatabaseError, RecordStore, Selector};
use crate::form::{Submission, SubmissionTarget};
use crate::table::query::path_segment;
use crate::types::{EntityKind, RecordId, Row};

/// Result of a write, carrying the stored snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MutationOutcome {
    Created { kind: EntityKind, record: Row },
    Updated { kind: EntityKind, record: Row },
    Deleted { kind: EntityKind, record: Row },
}

impl MutationOutcome {
    pub fn kind(&self) -> EntityKind {
        match self {
            MutationOutcome::Created { kind, .. }
            | MutationOutcome::Updated { kind, .. }
            | MutationOutcome::Deleted { kind, .. } => *kind,
        }
    }

    pub fn record(&self) -> &Row {
        match self {
            MutationOutcome::Created { record, .. }
            | MutationOutcome::Updated { record, .. }
            | MutationOutcome::Deleted { record, .. } => record,
        }
    }

    /// Same outcome with credential columns removed, for JSON responses
    pub fn redacted(self) -> Self {
        match self {
            MutationOutcome::Created { kind, record } => MutationOutcome::Created {
                record: without_secrets(kind, &record),
                kind,
            },
            MutationOutcome::Updated { kind, record } => MutationOutcome::Updated {
                record: without_secrets(kind, &record),
                kind,
            },
            MutationOutcome::Deleted { kind, record } => MutationOutcome::Deleted {
                record: without_secrets(kind, &record),
                kind,
            },
        }
    }

    /// Page to show once the write went through
    pub fn landing_path(&self) -> String {
        match self {
            MutationOutcome::Deleted { kind, record } => after_delete_path(*kind, record),
            MutationOutcome::Created { kind, record } | MutationOutcome::Updated { kind, record } => {
                parent_path(*kind, record)
            }
        }
    }
}

pub(crate) fn int(row: &Row, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn text(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Page a record belongs to: cases for work items, clients for payments and contracts
pub fn parent_path(kind: EntityKind, row: &Row) -> String {
    let (base, key) = match kind {
        EntityKind::Client => ("/client", "ClientID"),
        EntityKind::Case | EntityKind::Work => ("/case", "CaseNum"),
        EntityKind::Lawyer => ("/lawyer", "LawyerID"),
        EntityKind::Payment | EntityKind::Contract => ("/client", "ClientID"),
    };
    match text(row, key) {
        Some(id) => format!("{}/{}", base, path_segment(&id)),
        None => "/".to_string(),
    }
}

/// Like `parent_path`, but never the page of the record that is gone
pub fn after_delete_path(kind: EntityKind, row: &Row) -> String {
    match kind {
        EntityKind::Client => "/client/all".to_string(),
        EntityKind::Lawyer => "/lawyer/all".to_string(),
        EntityKind::Case => parent_path(EntityKind::Client, row),
        other => parent_path(other, row),
    }
}

pub struct RecordService<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> RecordService<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// A blank serial key is left for the store to assign
    pub async fn create(&self, kind: EntityKind, mut record: Row) -> Result<MutationOutcome, DatabaseError> {
        let key = kind.primary_key();
        let blank = match record.get(key) {
            Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            _ => false,
        };
        if blank && !kind.has_text_key() {
            record.remove(key);
        }
        let record = self.store.create(kind, record).await?;
        info!("Created {} {}", kind, display_id(kind, &record));
        Ok(MutationOutcome::Created { kind, record })
    }

    pub async fn update(&self, kind: EntityKind, id: &RecordId, record: Row) -> Result<MutationOutcome, DatabaseError> {
        let record = self.store.update(kind, id, record).await?;
        info!("Updated {} {}", kind, id);
        Ok(MutationOutcome::Updated { kind, record })
    }

    pub async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<MutationOutcome, DatabaseError> {
        let record = self.store.delete(kind, id).await?;
        info!("Deleted {} {}", kind, id);
        Ok(MutationOutcome::Deleted { kind, record })
    }

    /// Apply a whole-record form submission
    pub async fn submit(&self, submission: Submission) -> Result<MutationOutcome, DatabaseError> {
        match submission.target {
            SubmissionTarget::Create => self.create(submission.kind, submission.record).await,
            SubmissionTarget::Update(id) => self.update(submission.kind, &id, submission.record).await,
        }
    }

    pub async fn assigned_lawyer_ids(&self, case_num: &str) -> Result<Vec<i64>, DatabaseError> {
        Ok(self
            .store
            .lawyers_for_case(case_num)
            .await?
            .iter()
            .filter_map(|row| int(row, "LawyerID"))
            .collect())
    }

    /// Clients with at least one case assigned to the signed-in lawyer
    pub async fn lawyer_client_ids(&self, ctx: Option<&AuthContext>) -> Result<Vec<i64>, DatabaseError> {
        let Some(lawyer_id) = ctx.and_then(AuthContext::lawyer_id) else {
            return Ok(vec![]);
        };
        let mut ids: Vec<i64> = self
            .store
            .cases_for_lawyer(lawyer_id)
            .await?
            .iter()
            .filter_map(|row| int(row, "ClientID"))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Who may see a stored record
    pub async fn access(&self, ctx: Option<&AuthContext>, kind: EntityKind, row: &Row) -> Result<Access, DatabaseError> {
        if ctx.is_none() {
            return Ok(Access::Login);
        }
        let decision = match kind {
            EntityKind::Client => match int(row, "ClientID") {
                Some(id) => access::client_access(ctx, id, &self.lawyer_client_ids(ctx).await?),
                None => access::write_access(ctx),
            },
            EntityKind::Payment | EntityKind::Contract => match int(row, "ClientID") {
                Some(id) => access::client_access(ctx, id, &self.lawyer_client_ids(ctx).await?),
                None => access::write_access(ctx),
            },
            EntityKind::Case => self.case_access(ctx, row).await?,
            EntityKind::Work => {
                let case = match text(row, "CaseNum") {
                    Some(num) => self.store.fetch(EntityKind::Case, &RecordId::Text(num)).await?,
                    None => None,
                };
                match case {
                    Some(case) => self.case_access(ctx, &case).await?,
                    None => access::write_access(ctx),
                }
            }
            EntityKind::Lawyer => match int(row, "LawyerID") {
                Some(id) => access::lawyer_access(ctx, id),
                None => access::write_access(ctx),
            },
        };
        if decision == Access::Deny {
            warn!("Denied {} access to {}", kind, display_id(kind, row));
        }
        Ok(decision)
    }

    async fn case_access(&self, ctx: Option<&AuthContext>, case: &Row) -> Result<Access, DatabaseError> {
        let owner = int(case, "ClientID").unwrap_or_default();
        let lawyers = match text(case, "CaseNum") {
            Some(num) => self.assigned_lawyer_ids(&num).await?,
            None => vec![],
        };
        Ok(access::case_access(ctx, owner, &lawyers))
    }

    /// Who may create a record: admins, plus assigned lawyers adding work to their case
    pub async fn create_access(&self, ctx: Option<&AuthContext>, kind: EntityKind, draft: &Row) -> Result<Access, DatabaseError> {
        let admin = access::write_access(ctx);
        if admin != Access::Deny || kind != EntityKind::Work {
            return Ok(admin);
        }
        let lawyers = match text(draft, "CaseNum") {
            Some(num) => self.assigned_lawyer_ids(&num).await?,
            None => vec![],
        };
        Ok(if access::can_add_work(ctx, &lawyers) {
            Access::Allow
        } else {
            Access::Deny
        })
    }

    /// Rows of `kind` visible in a list, for the JSON collection export
    pub async fn list(&self, kind: EntityKind, selector: Selector) -> Result<Vec<Row>, DatabaseError> {
        Ok(self
            .store
            .list(kind, selector)
            .await?
            .iter()
            .map(|row| without_secrets(kind, row))
            .collect())
    }
}

fn display_id(kind: EntityKind, row: &Row) -> String {
    kind.id_of(row).map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
}
