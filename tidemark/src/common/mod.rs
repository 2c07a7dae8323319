//! Common types shared by the command model, the planner and the providers.

mod constants;
mod db_type;
mod direction;
mod timestamp;
mod value;

pub use constants::*;
pub use db_type::DbType;
pub use direction::Direction;
pub use timestamp::Timestamp;
pub use value::Value;
