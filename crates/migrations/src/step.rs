use crate::{MigrationContext, MigrationError};

/// One named, atomic schema change.
pub trait MigrationStep: Send + Sync {
    fn name(&self) -> &str;

    /// Whether [`migrate`](Self::migrate) has anything to do. A step that
    /// returns `false` is skipped and not recorded in the ledger.
    fn requires_execution(&self, ctx: &mut MigrationContext<'_>) -> Result<bool, MigrationError> {
        let _ = ctx;
        Ok(true)
    }

    /// Must tolerate preconditions that are already satisfied, e.g. by using
    /// the `*_if_not_exists` helpers.
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError>;
}
