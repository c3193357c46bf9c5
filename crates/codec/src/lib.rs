//! Stable byte format for traced regions.
//!
//! `decode(encode(points))` gives back exactly `points`, bit for bit. A record
//! that can not be read fails on its own; [`decode_all`] skips such records so
//! one corrupt region never hides the others.

use std::fmt::Display;

use model::GeoPoint;
use serde_json::Value;

pub use error::{DecodeError, EncodeError};
pub use record::FORMAT_VERSION;

use record::{PointRecord, RecordV1};

pub mod error;
mod record;

pub fn encode(points: &[GeoPoint]) -> Result<Vec<u8>, EncodeError> {
    if let Some(index) = points.iter().position(|point| !point.is_finite()) {
        // json has no representation for NaN or infinity
        return Err(EncodeError::NonFiniteCoordinate { index });
    }
    if let Some(index) = points.iter().position(|point| !point.is_in_range()) {
        // would be refused on decode
        return Err(EncodeError::CoordinateOutOfRange { index });
    }
    let record = RecordV1 {
        version: FORMAT_VERSION,
        points: points.iter().map(PointRecord::from).collect(),
    };
    Ok(serde_json::to_vec(&record)?)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<GeoPoint>, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let version = value
        .get("version")
        .ok_or_else(|| DecodeError::malformed("missing version tag"))?
        .as_u64()
        .ok_or_else(|| DecodeError::malformed("version tag is not an integer"))?;

    match version {
        1 => {
            let record: RecordV1 = serde_json::from_value(value)?;
            let points = record
                .points
                .into_iter()
                .map(GeoPoint::from)
                .collect::<Vec<_>>();
            if let Some(index) = points.iter().position(|point| !point.is_in_range()) {
                return Err(DecodeError::malformed(format!(
                    "point {} is outside the coordinate range",
                    index
                )));
            }
            Ok(points)
        }
        other => Err(DecodeError::malformed(format!(
            "unsupported format version {}",
            other
        ))),
    }
}

/// Decodes records one after another, dropping (and logging) the ones that
/// fail. The order of the remaining records is kept.
pub fn decode_all<K, B, I>(records: I) -> Vec<(K, Vec<GeoPoint>)>
where
    I: IntoIterator<Item = (K, B)>,
    K: Display,
    B: AsRef<[u8]>,
{
    records
        .into_iter()
        .filter_map(|(key, bytes)| match decode(bytes.as_ref()) {
            Ok(points) => Some((key, points)),
            Err(why) => {
                log::warn!("skipping stored region {}: {}", key, why);
                None
            }
        })
        .collect()
}
