use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{GeneratedRecord, RecordStore, StoreError, UpsertOutcome};

type Partition = Arc<RwLock<BTreeMap<i64, String>>>;

/// In-process record store.
///
/// Each endpoint owns a partition behind its own lock, so writes on one
/// endpoint never wait on another. The outer map lock is only held long
/// enough to find or create a partition.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    partitions: Arc<RwLock<HashMap<String, Partition>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn existing(&self, endpoint: &str) -> Option<Partition> {
        self.partitions.read().await.get(endpoint).cloned()
    }

    async fn partition(&self, endpoint: &str) -> Partition {
        if let Some(partition) = self.existing(endpoint).await {
            return partition;
        }
        let mut partitions = self.partitions.write().await;
        partitions.entry(endpoint.to_string()).or_default().clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, endpoint: &str, data: String) -> Result<i64, StoreError> {
        let partition = self.partition(endpoint).await;
        let mut records = partition.write().await;
        let next_id = records
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StoreError::IdSpaceExhausted(endpoint.to_string()))?;
        records.insert(next_id, data);
        Ok(next_id)
    }

    async fn find(
        &self,
        endpoint: &str,
        internal_id: i64,
    ) -> Result<Option<GeneratedRecord>, StoreError> {
        let Some(partition) = self.existing(endpoint).await else {
            return Ok(None);
        };
        let records = partition.read().await;
        Ok(records
            .get(&internal_id)
            .map(|data| GeneratedRecord::new(endpoint, internal_id, data.clone())))
    }

    async fn list(&self, endpoint: &str) -> Result<Vec<GeneratedRecord>, StoreError> {
        let Some(partition) = self.existing(endpoint).await else {
            return Ok(Vec::new());
        };
        let records = partition.read().await;
        Ok(records
            .iter()
            .map(|(id, data)| GeneratedRecord::new(endpoint, *id, data.clone()))
            .collect())
    }

    async fn upsert(
        &self,
        endpoint: &str,
        internal_id: i64,
        data: String,
    ) -> Result<UpsertOutcome, StoreError> {
        let partition = self.partition(endpoint).await;
        let mut records = partition.write().await;
        match records.insert(internal_id, data) {
            Some(_) => Ok(UpsertOutcome::Updated),
            None => Ok(UpsertOutcome::Created),
        }
    }

    async fn delete(&self, endpoint: &str, internal_id: i64) -> Result<bool, StoreError> {
        let Some(partition) = self.existing(endpoint).await else {
            return Ok(false);
        };
        let mut records = partition.write().await;
        Ok(records.remove(&internal_id).is_some())
    }

    async fn count(&self, endpoint: &str) -> Result<usize, StoreError> {
        match self.existing(endpoint).await {
            Some(partition) => Ok(partition.read().await.len()),
            None => Ok(0),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let partitions = self.partitions.read().await;
        for partition in partitions.values() {
            partition.write().await.clear();
        }
        Ok(())
    }
}
