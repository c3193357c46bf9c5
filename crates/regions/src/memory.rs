use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use model::Region;
use tokio::sync::Mutex;
use utility::id::Id;

use crate::database::{
    Database, DatabaseAutocommit, RegionRecord, RegionRepo, Result, StorageError,
};

type Records = Arc<Mutex<IndexMap<Id<Region>, RegionRecord>>>;

/// Keeps regions in memory, in insertion order. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    records: Records,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct InMemoryAutocommit {
    records: Records,
}

impl DatabaseAutocommit for InMemoryAutocommit {}

impl Database for InMemoryDatabase {
    type Autocommit = InMemoryAutocommit;

    fn auto(&self) -> Self::Autocommit {
        InMemoryAutocommit {
            records: self.records.clone(),
        }
    }
}

#[async_trait]
impl RegionRepo for InMemoryAutocommit {
    async fn list_regions(&mut self) -> Result<Vec<RegionRecord>> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn save_region(&mut self, record: RegionRecord) -> Result<()> {
        self.records.lock().await.insert(record.id, record);
        Ok(())
    }

    async fn delete_region(&mut self, id: Id<Region>) -> Result<()> {
        self.records
            .lock()
            .await
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn delete_all(&mut self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}
