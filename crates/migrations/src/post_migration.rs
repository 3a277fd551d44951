use schema::Database;

use crate::{MigrationError, MigrationReport};

/// Work that follows a run which completed at least one step, such as
/// refreshing state derived from the whole schema. Post-migrations are not
/// recorded in the ledger and run again after every such run.
pub trait PostMigration: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, db: &mut dyn Database, report: &MigrationReport) -> Result<(), MigrationError>;
}
