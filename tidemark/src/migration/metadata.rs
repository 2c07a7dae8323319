use std::fmt::{Display, Formatter};

use crate::common::Timestamp;

/// Identity of a migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MigrationMetadata {
    timestamp: Timestamp,
    name: String,
    tag: Option<String>,
}

impl MigrationMetadata {
    pub fn new(timestamp: i64, name: &str) -> Self {
        MigrationMetadata {
            timestamp: Timestamp::new(timestamp),
            name: name.to_string(),
            tag: None,
        }
    }

    /// Attaches a free-text tag, e.g. a ticket reference.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl Display for MigrationMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.timestamp, self.name)
    }
}

/// Types that carry their own migration metadata.
///
/// Usually derived with `#[derive(MigrationExport)]` from the `tidemark-derive`
/// crate.
pub trait MigrationExport {
    fn metadata() -> MigrationMetadata;
}
