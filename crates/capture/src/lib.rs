//! Turns a stream of tap and drag input into an ordered, distance-filtered
//! list of vertices and finally into a [`Region`](model::Region).

pub use builder::{TraceBuilder, TraceOptions, TraceSnapshot, UndoPolicy};
pub use error::TraceError;
pub use input::InputEvent;

pub mod builder;
pub mod error;
pub mod input;
