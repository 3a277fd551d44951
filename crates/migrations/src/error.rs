use ledger::LedgerError;
use schema::{DatabaseError, SchemaError};
use semver::Version;
use thiserror::Error;

use crate::MigrationReport;

/// Raised by a single step.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum MigrationRunError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("plan `{plan}` declares more than one step at version {version}")]
    DuplicateVersion { plan: String, version: Version },

    #[error("migration `{name}` ({version}) of plan `{plan}` failed: {source}")]
    StepFailed {
        plan: String,
        name: String,
        version: Version,
        report: MigrationReport,
        #[source]
        source: MigrationError,
    },

    #[error("post-migration `{name}` of plan `{plan}` failed: {source}")]
    PostMigrationFailed {
        plan: String,
        name: String,
        report: MigrationReport,
        #[source]
        source: MigrationError,
    },
}
