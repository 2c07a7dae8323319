use crate::common::Direction;

/// What a migration can learn about the run it is part of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationContext {
    provider_name: String,
    direction: Direction,
}

impl MigrationContext {
    pub fn new(provider_name: &str, direction: Direction) -> Self {
        MigrationContext {
            provider_name: provider_name.to_string(),
            direction,
        }
    }

    /// Invariant name of the provider the commands will be compiled by.
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
