use std::{error, result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::Region;
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no such region")]
    NotFound,

    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl StorageError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, StorageError>;

/// A region as the storage engine sees it. The points are opaque bytes
/// produced by the codec.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub id: Id<Region>,
    pub created_at: DateTime<Utc>,
    pub raw_bytes: Vec<u8>,
}

#[async_trait]
pub trait RegionRepo {
    /// All stored regions, oldest first.
    async fn list_regions(&mut self) -> Result<Vec<RegionRecord>>;

    /// Stores a record. Saving an id that already exists replaces it.
    async fn save_region(&mut self, record: RegionRecord) -> Result<()>;

    /// Fails with `StorageError::NotFound` if there is no such region.
    async fn delete_region(&mut self, id: Id<Region>) -> Result<()>;

    async fn delete_all(&mut self) -> Result<()>;
}

pub trait DatabaseAutocommit: RegionRepo {}

pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Autocommit: DatabaseAutocommit + Send;

    /// A handle whose operations each commit on their own.
    fn auto(&self) -> Self::Autocommit;
}
