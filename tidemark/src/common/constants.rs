/// Name of the table the default versioning store keeps its records in.
pub const DEFAULT_VERSION_TABLE: &str = "tidemark_versions";

/// Column of the version table holding one applied version marker per row.
pub const VERSION_COLUMN: &str = "timestamp";

/// Invariant name under which the in-memory provider is registered.
pub const MEMORY_PROVIDER: &str = "memory";

/// `chrono` format used when displaying a version marker.
pub(crate) const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
