use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use roomquote_estimate::Estimate;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Whole-document session persistence keyed by estimate id. An estimate is
/// always written back as one unit; there is no field-level patch
/// operation, so stale totals can never outlive the mutation that made
/// them stale.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_estimate(&self, estimate_id: &str) -> Result<Option<Estimate>, StoreError>;

    async fn put_estimate(&self, estimate: Estimate) -> Result<(), StoreError>;

    async fn list_estimates(&self) -> Result<HashMap<String, Estimate>, StoreError>;

    async fn remove_estimate(&self, estimate_id: &str) -> Result<Option<Estimate>, StoreError>;
}

/// In-memory reference store. One map behind one lock; the host serializes
/// mutations per session.
#[derive(Default)]
pub struct MemorySessionStore {
    estimates: RwLock<HashMap<String, Estimate>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_estimate(&self, estimate_id: &str) -> Result<Option<Estimate>, StoreError> {
        Ok(self.estimates.read().await.get(estimate_id).cloned())
    }

    async fn put_estimate(&self, estimate: Estimate) -> Result<(), StoreError> {
        info!(estimate_id = %estimate.id, "estimate stored");
        self.estimates
            .write()
            .await
            .insert(estimate.id.clone(), estimate);
        Ok(())
    }

    async fn list_estimates(&self) -> Result<HashMap<String, Estimate>, StoreError> {
        Ok(self.estimates.read().await.clone())
    }

    async fn remove_estimate(&self, estimate_id: &str) -> Result<Option<Estimate>, StoreError> {
        let removed = self.estimates.write().await.remove(estimate_id);
        if removed.is_some() {
            info!(estimate_id = %estimate_id, "estimate removed");
        }
        Ok(removed)
    }
}
