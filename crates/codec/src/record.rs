//! On-disk layout of a stored region:
//!
//! ```json
//! {"version":1,"points":[{"lat":54.3233,"lon":10.1394}]}
//! ```
//!
//! Coordinates are written in their shortest exact form, so parsing them back
//! yields the identical `f64`.

use model::GeoPoint;
use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecordV1 {
    pub version: u32,
    pub points: Vec<PointRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct PointRecord {
    pub lat: f64,
    pub lon: f64,
}

impl From<&GeoPoint> for PointRecord {
    fn from(point: &GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lon: point.longitude,
        }
    }
}

impl From<PointRecord> for GeoPoint {
    fn from(record: PointRecord) -> Self {
        GeoPoint::new(record.lat, record.lon)
    }
}
