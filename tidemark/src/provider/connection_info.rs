use std::fmt::{Display, Formatter};

/// Where the target database lives and which provider talks to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    connection_string: String,
    provider_name: String,
}

impl ConnectionInfo {
    pub fn new(connection_string: &str, provider_name: &str) -> Self {
        ConnectionInfo {
            connection_string: connection_string.to_string(),
            provider_name: provider_name.to_string(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Invariant name of the provider, see [`Provider::invariant_name`](super::Provider::invariant_name).
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

impl Display for ConnectionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.provider_name, self.connection_string)
    }
}
