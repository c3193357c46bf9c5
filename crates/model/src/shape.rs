use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What a renderer should draw for the current trace. Derived from the point
/// count alone and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RenderShape {
    #[default]
    None,
    Polyline,
    Polygon,
}

impl RenderShape {
    pub fn from_point_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::None,
            2 => Self::Polyline,
            _ => Self::Polygon,
        }
    }
}
