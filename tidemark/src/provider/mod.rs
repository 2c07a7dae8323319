//! Backend collaborators: providers, connections and scoped transactions.
//!
//! A [`Provider`] turns the provider-agnostic [`SchemaCommand`]s recorded by a
//! migration into backend statements and opens [`Connection`]s from a
//! connection string. The planner and the executor only ever talk to a backend
//! through these two traits; the core itself never produces SQL.
//!
//! Providers are registered with a [`ProviderFactory`] under their invariant
//! name and resolved from a [`ConnectionInfo`] when a batch is planned.
//!
//! [`SchemaCommand`]: crate::schema::SchemaCommand

mod connection;
mod connection_info;
mod migration_provider;
mod provider_factory;
mod transaction_scope;

pub use connection::Connection;
pub use connection_info::ConnectionInfo;
pub use migration_provider::Provider;
pub use provider_factory::ProviderFactory;
pub use transaction_scope::TransactionScope;
