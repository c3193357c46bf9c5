use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("a region needs at least {required} points, the trace has {actual}")]
    InsufficientPoints { required: usize, actual: usize },
}
