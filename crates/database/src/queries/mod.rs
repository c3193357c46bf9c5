use regions::database::StorageError;

pub mod region;

pub(crate) fn convert_error(why: sqlx::Error) -> StorageError {
    match why {
        sqlx::Error::RowNotFound => StorageError::NotFound,
        _ => StorageError::Other(Box::new(why)),
    }
}
