use tracing::{info, warn};

use crate::database::models::{Client, Lawyer};
use crate::database::repository::decode;
use crate::database::{DatabaseError, RecordStore};
use crate::types::EntityKind;

use super::access::{AuthContext, Principal};

/// Exact user/pass match against clients first, then lawyers.
///
/// Returns `None` on any mismatch without saying which part was wrong.
pub async fn authorize(store: &dyn RecordStore, user: &str, pass: &str) -> Result<Option<AuthContext>, DatabaseError> {
    if user.is_empty() || pass.is_empty() {
        return Ok(None);
    }

    if let Some(row) = store.find_by_credentials(EntityKind::Client, user, pass).await? {
        let client: Client = decode(EntityKind::Client, row)?;
        info!("Client {} signed in", client.client_id);
        return Ok(Some(AuthContext::new(
            Principal::Client,
            client.client_id,
            client.display_name(),
            false,
        )));
    }

    if let Some(row) = store.find_by_credentials(EntityKind::Lawyer, user, pass).await? {
        let lawyer: Lawyer = decode(EntityKind::Lawyer, row)?;
        info!("Lawyer {} signed in", lawyer.lawyer_id);
        return Ok(Some(AuthContext::new(
            Principal::Lawyer,
            lawyer.lawyer_id,
            lawyer.display_name(),
            lawyer.is_manager.unwrap_or(false),
        )));
    }

    warn!("Failed login attempt");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let client = json!({"ClientID": 1, "LastName": "Santos", "FirstName": "Amy", "user": "same", "pass": "pw"});
        let lawyer = json!({"LawyerID": 1, "LastName": "Reyes", "isManager": true, "user": "same", "pass": "pw"});
        let boss = json!({"LawyerID": 2, "LastName": "Tan", "isManager": true, "user": "boss", "pass": "pw"});
        store.create(EntityKind::Client, client.as_object().cloned().unwrap()).await.unwrap();
        store.create(EntityKind::Lawyer, lawyer.as_object().cloned().unwrap()).await.unwrap();
        store.create(EntityKind::Lawyer, boss.as_object().cloned().unwrap()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn client_wins_over_lawyer() {
        let store = store().await;
        let ctx = authorize(&store, "same", "pw").await.unwrap().unwrap();
        assert!(ctx.is_client);
        assert_eq!(ctx.name, "Santos, Amy");
    }

    #[tokio::test]
    async fn manager_becomes_admin() {
        let store = store().await;
        let ctx = authorize(&store, "boss", "pw").await.unwrap().unwrap();
        assert!(ctx.is_admin && ctx.is_lawyer);
        assert_eq!(ctx.user_id, 2);
    }

    #[tokio::test]
    async fn mismatches_yield_nothing() {
        let store = store().await;
        assert!(authorize(&store, "boss", "PW").await.unwrap().is_none());
        assert!(authorize(&store, "", "").await.unwrap().is_none());
    }
}
