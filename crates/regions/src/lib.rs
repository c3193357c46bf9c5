use capture::TraceError;
use codec::EncodeError;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

pub mod client;
pub mod database;
pub mod memory;
pub mod session;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the requested region does not exist")]
    NotFound,

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("could not encode region: {0}")]
    Encode(#[from] EncodeError),

    #[error("storage failed: {0}")]
    Storage(database::StorageError),

    #[error("the editing session is no longer running")]
    SessionClosed,
}

impl From<database::StorageError> for RequestError {
    fn from(value: database::StorageError) -> Self {
        match value {
            database::StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

impl<T> From<mpsc::error::SendError<T>> for RequestError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::SessionClosed
    }
}

impl From<oneshot::error::RecvError> for RequestError {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::SessionClosed
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
