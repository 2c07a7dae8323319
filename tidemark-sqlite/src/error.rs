use rusqlite::ErrorCode;
use thiserror::Error;
use tidemark::errors::{ErrorKind, TidemarkError};

/// Error raised when a SQLite value has no Tidemark counterpart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SqliteValueError {
    /// A blob column, which has no scalar counterpart
    #[error("Column {0} holds a blob, which cannot be read as a value")]
    Blob(usize),
    /// A text column holding invalid UTF-8
    #[error("Column {0} holds invalid UTF-8 text")]
    InvalidUtf8(usize),
}

impl From<SqliteValueError> for TidemarkError {
    fn from(err: SqliteValueError) -> Self {
        TidemarkError::new(&err.to_string(), ErrorKind::EncodingError)
    }
}

pub(crate) fn to_tidemark_error(error: rusqlite::Error) -> TidemarkError {
    let error_kind = match &error {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::CannotOpen
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::DiskFull
            | ErrorCode::SystemIoFailure
            | ErrorCode::NotADatabase => ErrorKind::IOError,
            _ => ErrorKind::ProviderError,
        },
        rusqlite::Error::Utf8Error(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            ErrorKind::EncodingError
        }
        _ => ErrorKind::ProviderError,
    };
    TidemarkError::new(&format!("SQLite error: {}", error), error_kind)
}
