use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo::{clamp_latitude, haversine_distance, wrap_longitude};

use crate::ExampleData;

/// A single vertex of a trace, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Brings a point derived from map panning back into range. Raw input is
    /// never normalized.
    pub fn normalized(self) -> Self {
        Self {
            latitude: clamp_latitude(self.latitude),
            longitude: wrap_longitude(self.longitude),
        }
    }
}

impl ExampleData for GeoPoint {
    fn example_data() -> Self {
        Self::new(54.323334, 10.139444)
    }
}

/// Length in meters of the open path through `points`.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}
