use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::store::RecordStore;
use crate::types::{EntityKind, Row};

/// JSON fixture describing a whole practice; loaded by `agila seed` and the memory backend
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub contracts: Vec<Row>,
    pub clients: Vec<Row>,
    pub lawyers: Vec<Row>,
    pub cases: Vec<Row>,
    pub works: Vec<Row>,
    pub payments: Vec<Row>,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct Assignment {
    #[serde(rename = "CaseNum")]
    pub case_num: String,
    #[serde(rename = "LawyerID")]
    pub lawyer_id: i64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub records: usize,
    pub assignments: usize,
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self, DatabaseError> {
        serde_json::from_str(raw).map_err(|e| DatabaseError::Seed(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DatabaseError::Seed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    fn batches(self) -> [(EntityKind, Vec<Row>); 6] {
        [
            (EntityKind::Contract, self.contracts),
            (EntityKind::Client, self.clients),
            (EntityKind::Lawyer, self.lawyers),
            (EntityKind::Case, self.cases),
            (EntityKind::Work, self.works),
            (EntityKind::Payment, self.payments),
        ]
    }

    /// Insert every record, then the case/lawyer links
    pub async fn apply(mut self, store: &dyn RecordStore) -> Result<SeedSummary, DatabaseError> {
        let mut summary = SeedSummary::default();
        let assignments = std::mem::take(&mut self.assignments);
        for (kind, rows) in self.batches() {
            for row in rows {
                store.create(kind, row).await?;
                summary.records += 1;
            }
        }
        for link in assignments {
            store.assign_lawyer(&link.case_num, link.lawyer_id).await?;
            summary.assignments += 1;
        }
        info!(
            "Seeded {} records and {} assignments into {} store",
            summary.records,
            summary.assignments,
            store.backend()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::types::RecordId;

    #[tokio::test]
    async fn applies_fixture_in_dependency_order() {
        let fixture = Fixture::from_json(
            r#"{
                "clients": [{"ClientID": 1, "LastName": "Santos"}],
                "lawyers": [{"LawyerID": 4, "LastName": "Reyes"}],
                "cases": [{"CaseNum": "C1", "ClientID": 1, "ContractID": 1}],
                "assignments": [{"CaseNum": "C1", "LawyerID": 4}]
            }"#,
        )
        .unwrap();
        let store = MemoryStore::new();
        let summary = fixture.apply(&store).await.unwrap();
        assert_eq!(summary, SeedSummary { records: 3, assignments: 1 });
        assert!(store.fetch(EntityKind::Case, &RecordId::Text("C1".into())).await.unwrap().is_some());
        assert_eq!(store.cases_for_lawyer(4).await.unwrap().len(), 1);
    }

    #[test]
    fn bundled_demo_fixture_parses() {
        let fixture = Fixture::from_json(include_str!("../../fixtures/demo.json")).unwrap();
        assert!(!fixture.cases.is_empty());
        assert!(!fixture.assignments.is_empty());
    }
}
