use std::{fmt, str::FromStr};

use chrono::Utc;
use model::{region::MIN_REGION_POINTS, GeoPoint, Region, RenderShape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::error::TraceError;

pub const DEFAULT_MIN_DISTANCE_METERS: f64 = 3.0;

/// What `undo_last` does with the point the movement filter measures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndoPolicy {
    /// The anchor stays on the removed point, so the next drag point is
    /// measured against a vertex that is no longer part of the trace.
    #[default]
    KeepAnchor,
    /// The anchor moves back to the new last point (or is cleared).
    ResetAnchor,
}

impl FromStr for UndoPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-anchor" => Ok(Self::KeepAnchor),
            "reset-anchor" => Ok(Self::ResetAnchor),
            other => Err(format!(
                "unknown undo policy `{}`, expected `keep-anchor` or `reset-anchor`",
                other
            )),
        }
    }
}

impl fmt::Display for UndoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepAnchor => write!(f, "keep-anchor"),
            Self::ResetAnchor => write!(f, "reset-anchor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceOptions {
    /// Threshold used for drag input by [`TraceBuilder::apply`].
    pub min_distance_meters: f64,
    pub undo_policy: UndoPolicy,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            min_distance_meters: DEFAULT_MIN_DISTANCE_METERS,
            undo_policy: UndoPolicy::default(),
        }
    }
}

/// Plain data handed to whatever draws the trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraceSnapshot {
    pub editing: bool,
    pub shape: RenderShape,
    pub points: Vec<GeoPoint>,
}

/// The in-progress trace of one editing session.
///
/// Not thread safe by intent: the session owning it feeds it one event at a
/// time.
#[derive(Debug, Clone, Default)]
pub struct TraceBuilder {
    options: TraceOptions,
    points: Vec<GeoPoint>,
    last_accepted: Option<GeoPoint>,
    editing: bool,
}

impl TraceBuilder {
    pub fn new(options: TraceOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn last_accepted(&self) -> Option<GeoPoint> {
        self.last_accepted
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin(&mut self) {
        self.points.clear();
        self.last_accepted = None;
        self.editing = true;
    }

    /// Appends a tapped point.
    pub fn add_point(&mut self, point: GeoPoint) {
        if !self.accepts_input(&point) {
            return;
        }
        self.accept(point);
    }

    /// Appends a dragged point unless it is closer than `min_distance_meters`
    /// to the last accepted one. A point exactly at the threshold is kept.
    pub fn add_point_filtered(&mut self, point: GeoPoint, min_distance_meters: f64) {
        if !self.accepts_input(&point) {
            return;
        }
        if let Some(last) = self.last_accepted {
            if last.distance_to(&point) < min_distance_meters {
                return;
            }
        }
        self.accept(point);
    }

    pub fn undo_last(&mut self) {
        if self.points.pop().is_none() {
            return;
        }
        if self.options.undo_policy == UndoPolicy::ResetAnchor {
            self.last_accepted = self.points.last().copied();
        }
        log::debug!("undo, {} points left", self.points.len());
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.last_accepted = None;
    }

    pub fn current_shape(&self) -> RenderShape {
        RenderShape::from_point_count(self.points.len())
    }

    pub fn can_finalize(&self) -> bool {
        self.points.len() >= MIN_REGION_POINTS
    }

    /// Turns the trace into a region and resets the builder. With too few
    /// points the trace is left exactly as it was.
    pub fn finalize(&mut self) -> Result<Region, TraceError> {
        if !self.can_finalize() {
            return Err(TraceError::InsufficientPoints {
                required: MIN_REGION_POINTS,
                actual: self.points.len(),
            });
        }
        let points = std::mem::take(&mut self.points);
        self.last_accepted = None;
        self.editing = false;

        let region = Region {
            id: Id::generate(),
            created_at: Utc::now(),
            points,
        };
        log::debug!(
            "finalized region {} with {} points",
            region.id,
            region.points.len()
        );
        Ok(region)
    }

    pub fn cancel(&mut self) {
        self.clear();
        self.editing = false;
    }

    pub fn snapshot(&self) -> TraceSnapshot {
        TraceSnapshot {
            editing: self.editing,
            shape: self.current_shape(),
            points: self.points.clone(),
        }
    }

    fn accepts_input(&self, point: &GeoPoint) -> bool {
        if !self.editing {
            return false;
        }
        if !point.is_finite() {
            log::warn!("ignoring non-finite point {:?}", point);
            return false;
        }
        // raw input is refused, never normalized
        if !point.is_in_range() {
            log::warn!("ignoring out of range point {:?}", point);
            return false;
        }
        true
    }

    fn accept(&mut self, point: GeoPoint) {
        self.points.push(point);
        self.last_accepted = Some(point);
    }
}
