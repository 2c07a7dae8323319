use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Direction in which a migration step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

impl Direction {
    pub fn is_up(&self) -> bool {
        matches!(self, Direction::Up)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}
