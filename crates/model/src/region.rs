use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};
use uuid::Uuid;

use crate::{
    geo_point::{path_length, GeoPoint},
    ExampleData,
};

/// Fewest points a finalized region may have.
pub const MIN_REGION_POINTS: usize = 3;

/// A finalized, closed polygon. Regions are never edited after creation; they
/// are only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: Id<Region>,
    pub created_at: DateTime<Utc>,
    pub points: Vec<GeoPoint>,
}

impl HasId for Region {
    type IdType = Uuid;
}

impl Region {
    /// Assembles a region from already validated parts, e.g. a stored record.
    /// Returns `None` if there are not enough points for a polygon.
    pub fn from_parts(
        id: Id<Region>,
        created_at: DateTime<Utc>,
        points: Vec<GeoPoint>,
    ) -> Option<Self> {
        if points.len() < MIN_REGION_POINTS {
            return None;
        }
        Some(Self {
            id,
            created_at,
            points,
        })
    }

    /// Length of the closed outline in meters, including the closing edge.
    pub fn perimeter_meters(&self) -> f64 {
        let closing = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.distance_to(first),
            _ => 0.0,
        };
        path_length(&self.points) + closing
    }
}

impl ExampleData for Region {
    fn example_data() -> Self {
        Self {
            id: Id::new(Uuid::nil()),
            created_at: Utc.with_ymd_and_hms(2024, 10, 19, 12, 0, 0).unwrap(),
            points: vec![
                GeoPoint::new(54.3233, 10.1394),
                GeoPoint::new(54.3240, 10.1410),
                GeoPoint::new(54.3225, 10.1422),
            ],
        }
    }
}
