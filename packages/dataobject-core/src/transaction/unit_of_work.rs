use tracing::warn;

use crate::error::Result;
use crate::gateway::SqlGateway;

/// RAII guard over an engine transaction with auto-rollback on drop.
///
/// When the engine reports no transaction support, commit and rollback
/// do nothing and callers fall back to compensating writes.
pub struct UnitOfWork<'a> {
    gateway: &'a dyn SqlGateway,
    /// Whether `begin` opened a transaction
    transactional: bool,
    /// Whether to roll back on drop
    auto_rollback: bool,
}

impl<'a> UnitOfWork<'a> {
    /// Opens a transaction on the gateway, if it supports one.
    pub fn begin(gateway: &'a dyn SqlGateway) -> Result<Self> {
        let transactional = gateway.begin()?;
        Ok(Self {
            gateway,
            transactional,
            auto_rollback: transactional,
        })
    }

    /// Whether an engine transaction is backing this unit.
    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> Result<()> {
        self.auto_rollback = false;
        if self.transactional {
            self.gateway.commit()?;
        }
        Ok(())
    }

    /// Rolls back the transaction.
    pub fn rollback(mut self) -> Result<()> {
        self.auto_rollback = false;
        if self.transactional {
            self.gateway.rollback()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for UnitOfWork<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("driver", &self.gateway.driver_name())
            .field("transactional", &self.transactional)
            .field("auto_rollback", &self.auto_rollback)
            .finish()
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if self.auto_rollback {
            if let Err(e) = self.gateway.rollback() {
                warn!(error = %e, "rollback on drop failed");
            }
        }
    }
}
