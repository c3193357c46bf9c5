use std::fmt;

use chrono::{DateTime, Utc};
use model::Region;
use utility::id::Id;

use crate::{
    database::{Database, RegionRecord, RegionRepo},
    RequestError, RequestResult,
};

/// Loads, saves and deletes finalized regions. Only encoded bytes ever reach
/// the database.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
}

/// Identifies a stored record while its bytes are being decoded.
struct RecordKey {
    id: Id<Region>,
    created_at: DateTime<Utc>,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// All regions that can be read back, oldest first. Unreadable records are
    /// left out instead of failing the whole load.
    pub async fn get_regions(&self) -> RequestResult<Vec<Region>> {
        let records = self.database.auto().list_regions().await?;
        let total = records.len();

        let regions = codec::decode_all(records.into_iter().map(|record| {
            let key = RecordKey {
                id: record.id,
                created_at: record.created_at,
            };
            (key, record.raw_bytes)
        }))
        .into_iter()
        .filter_map(|(key, points)| {
            let count = points.len();
            let region = Region::from_parts(key.id, key.created_at, points);
            if region.is_none() {
                log::warn!("skipping stored region {} with {} points", key, count);
            }
            region
        })
        .collect::<Vec<_>>();

        if regions.len() < total {
            log::info!("loaded {} of {} stored regions", regions.len(), total);
        }
        Ok(regions)
    }

    /// Only the requested record is decoded. One that can not be read is
    /// treated like a missing one, as in [`Client::get_regions`].
    pub async fn get_region(&self, id: Id<Region>) -> RequestResult<Region> {
        let record = self
            .database
            .auto()
            .list_regions()
            .await?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or(RequestError::NotFound)?;

        let points = codec::decode(&record.raw_bytes).map_err(|why| {
            log::warn!("stored region {} is unreadable: {}", id, why);
            RequestError::NotFound
        })?;
        let count = points.len();
        Region::from_parts(record.id, record.created_at, points).ok_or_else(|| {
            log::warn!("stored region {} has only {} points", id, count);
            RequestError::NotFound
        })
    }

    pub async fn save_region(&self, region: &Region) -> RequestResult<()> {
        let raw_bytes = codec::encode(&region.points).map_err(|why| {
            log::error!("could not encode region {}: {}", region.id, why);
            RequestError::from(why)
        })?;
        self.database
            .auto()
            .save_region(RegionRecord {
                id: region.id,
                created_at: region.created_at,
                raw_bytes,
            })
            .await?;
        log::info!("saved region {} ({} points)", region.id, region.points.len());
        Ok(())
    }

    pub async fn delete_region(&self, id: Id<Region>) -> RequestResult<()> {
        self.database.auto().delete_region(id).await?;
        log::info!("deleted region {}", id);
        Ok(())
    }

    pub async fn delete_all(&self) -> RequestResult<()> {
        self.database.auto().delete_all().await?;
        log::info!("deleted all regions");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use model::GeoPoint;

    use super::*;
    use crate::memory::InMemoryDatabase;

    fn region(offset: f64) -> Region {
        Region {
            id: Id::generate(),
            created_at: Utc::now(),
            points: vec![
                GeoPoint::new(offset, 0.0),
                GeoPoint::new(offset, 0.001),
                GeoPoint::new(offset + 0.001, 0.0),
            ],
        }
    }

    #[tokio::test]
    async fn saved_regions_load_back_in_order() {
        let client = Client::new(InMemoryDatabase::new());
        let (a, b) = (region(1.0), region(2.0));
        client.save_region(&a).await.unwrap();
        client.save_region(&b).await.unwrap();

        assert_eq!(client.get_regions().await.unwrap(), vec![a.clone(), b]);
        assert_eq!(client.get_region(a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn malformed_record_does_not_hide_siblings() {
        let database = InMemoryDatabase::new();
        let client = Client::new(database.clone());
        let (a, b) = (region(1.0), region(2.0));
        client.save_region(&a).await.unwrap();
        database
            .auto()
            .save_region(RegionRecord {
                id: Id::generate(),
                created_at: Utc::now(),
                raw_bytes: br#"{"version":1,"points":[{"lat":1.0,"#.to_vec(),
            })
            .await
            .unwrap();
        client.save_region(&b).await.unwrap();

        assert_eq!(client.get_regions().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn single_region_lookup_ignores_broken_siblings() {
        let database = InMemoryDatabase::new();
        let client = Client::new(database.clone());
        let broken = |raw_bytes: &[u8]| RegionRecord {
            id: Id::generate(),
            created_at: Utc::now(),
            raw_bytes: raw_bytes.to_vec(),
        };
        let (truncated, short) = (
            broken(br#"{"version":1,"points":[{"lat""#),
            broken(&codec::encode(&[GeoPoint::new(0.0, 0.0)]).unwrap()),
        );
        let a = region(1.0);
        database.auto().save_region(truncated.clone()).await.unwrap();
        client.save_region(&a).await.unwrap();
        database.auto().save_region(short.clone()).await.unwrap();

        assert_eq!(client.get_region(a.id).await.unwrap(), a);
        for id in [truncated.id, short.id] {
            assert!(matches!(
                client.get_region(id).await,
                Err(RequestError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn records_with_too_few_points_are_skipped() {
        let database = InMemoryDatabase::new();
        let client = Client::new(database.clone());
        database
            .auto()
            .save_region(RegionRecord {
                id: Id::generate(),
                created_at: Utc::now(),
                raw_bytes: codec::encode(&[GeoPoint::new(0.0, 0.0)]).unwrap(),
            })
            .await
            .unwrap();

        assert!(client.get_regions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let client = Client::new(InMemoryDatabase::new());
        assert!(matches!(
            client.get_region(Id::generate()).await,
            Err(RequestError::NotFound)
        ));
        assert!(matches!(
            client.delete_region(Id::generate()).await,
            Err(RequestError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deletes_single_and_all_regions() {
        let client = Client::new(InMemoryDatabase::new());
        let (a, b, c) = (region(1.0), region(2.0), region(3.0));
        for region in [&a, &b, &c] {
            client.save_region(region).await.unwrap();
        }

        client.delete_region(b.id).await.unwrap();
        assert_eq!(client.get_regions().await.unwrap(), vec![a, c]);

        client.delete_all().await.unwrap();
        assert!(client.get_regions().await.unwrap().is_empty());
    }
}
