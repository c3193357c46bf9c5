use chrono::{DateTime, Utc};
use model::Region;
use regions::database::RegionRecord;
use sqlx::prelude::FromRow;
use utility::id::Id;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RegionRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub raw_bytes: Vec<u8>,
}

impl RegionRow {
    pub fn to_model(self) -> RegionRecord {
        RegionRecord {
            id: Id::<Region>::new(self.id),
            created_at: self.created_at,
            raw_bytes: self.raw_bytes,
        }
    }
}
