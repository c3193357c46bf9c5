use std::fmt;

use thiserror::Error;

/// Encoding only fails when an invariant was broken upstream; it is never part
/// of normal control flow.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("point {index} is outside the coordinate range")]
    CoordinateOutOfRange { index: usize },

    #[error("serializer failed: {0}")]
    Serializer(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed region record: {reason}")]
    MalformedRecord { reason: String },
}

impl DecodeError {
    pub fn malformed(reason: impl fmt::Display) -> Self {
        Self::MalformedRecord {
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(why: serde_json::Error) -> Self {
        Self::malformed(why)
    }
}
