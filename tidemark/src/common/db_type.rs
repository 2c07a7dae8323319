use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Provider-agnostic column data types.
///
/// Providers map each variant to the closest native type of their backend; a
/// provider that has no mapping for a variant reports
/// [`ErrorKind::UnsupportedOperation`](crate::errors::ErrorKind::UnsupportedOperation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Decimal,
    Double,
    String,
    AnsiString,
    Date,
    DateTime,
    Guid,
    Binary,
}

impl DbType {
    /// Whether a column of this type accepts a size.
    pub fn is_sized(&self) -> bool {
        matches!(
            self,
            DbType::String | DbType::AnsiString | DbType::Binary | DbType::Decimal
        )
    }
}

impl Display for DbType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
