use super::Connection;
use crate::errors::TidemarkResult;

/// Transaction guard owning the connection of one migration step.
///
/// The transaction is begun on construction and rolled back when the scope is
/// dropped without a successful [`commit`](TransactionScope::commit), so every
/// exit path of a step releases it. After a commit the connection stays
/// usable outside any transaction.
///
/// ```rust,ignore
/// let mut scope = TransactionScope::begin(provider.connect("shop.db")?)?;
/// scope.connection().execute("ALTER TABLE Customers ADD COLUMN Email TEXT")?;
/// scope.commit()?;
/// ```
pub struct TransactionScope {
    connection: Box<dyn Connection>,
    completed: bool,
}

impl TransactionScope {
    pub fn begin(mut connection: Box<dyn Connection>) -> TidemarkResult<Self> {
        connection.begin()?;
        Ok(TransactionScope {
            connection,
            completed: false,
        })
    }

    pub fn connection(&mut self) -> &mut dyn Connection {
        self.connection.as_mut()
    }

    /// Commits the transaction. If the commit fails the scope still rolls
    /// back on drop.
    pub fn commit(&mut self) -> TidemarkResult<()> {
        if self.completed {
            return Ok(());
        }
        self.connection.commit()?;
        self.completed = true;
        Ok(())
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if !self.completed {
            log::debug!("Rolling back uncommitted migration transaction");
            if let Err(err) = self.connection.rollback() {
                log::warn!("Failed to roll back migration transaction: {}", err);
            }
        }
    }
}
