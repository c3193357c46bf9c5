use model::GeoPoint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::builder::TraceBuilder;

/// Events raised by the pointer layer, already projected to map coordinates.
/// They must arrive one at a time and in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "point", rename_all = "camelCase")]
pub enum InputEvent {
    Begin,
    Tap(GeoPoint),
    DragBegin(GeoPoint),
    DragChanged(GeoPoint),
    DragEnd(GeoPoint),
    Undo,
    Clear,
    Cancel,
}

impl InputEvent {
    /// The coordinate carried by the event, if any.
    pub fn point(&self) -> Option<GeoPoint> {
        match *self {
            Self::Tap(point)
            | Self::DragBegin(point)
            | Self::DragChanged(point)
            | Self::DragEnd(point) => Some(point),
            Self::Begin | Self::Undo | Self::Clear | Self::Cancel => None,
        }
    }
}

impl TraceBuilder {
    /// Applies a single input event. Finalizing is not an input event since it
    /// produces a result; call [`TraceBuilder::finalize`] for that.
    pub fn apply(&mut self, event: InputEvent) {
        let min_distance = self.options().min_distance_meters;
        match event {
            InputEvent::Begin => self.begin(),
            InputEvent::Tap(point) => self.add_point(point),
            InputEvent::DragBegin(point)
            | InputEvent::DragChanged(point)
            | InputEvent::DragEnd(point) => self.add_point_filtered(point, min_distance),
            InputEvent::Undo => self.undo_last(),
            InputEvent::Clear => self.clear(),
            InputEvent::Cancel => self.cancel(),
        }
    }
}
