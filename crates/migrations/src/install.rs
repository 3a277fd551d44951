use ledger::LedgerState;
use schema::SchemaSnapshot;
use semver::Version;
use serde::Serialize;

use crate::{
    tables::{core_tables, ISO_CODE_WIDTH},
    CORE_PLAN,
};

/// What a database holds before the core plan runs.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InstallState {
    /// None of the core tables exist.
    Fresh,
    /// The ledger has entries for the core plan, up to `version`.
    Recorded { version: Version },
    /// Core tables exist but the ledger has no entry for the core plan, as in
    /// databases set up before the ledger was kept. `detected` is the
    /// highest version whose changes are all present in the schema.
    Unrecorded { detected: Version },
}

impl InstallState {
    pub fn is_fresh(&self) -> bool {
        matches!(self, InstallState::Fresh)
    }
}

pub fn core_install_state(schema: &SchemaSnapshot, ledger: &LedgerState) -> InstallState {
    if let Some(version) = ledger
        .entries_for(CORE_PLAN)
        .map(|entry| &entry.version)
        .max()
    {
        return InstallState::Recorded {
            version: version.clone(),
        };
    }

    if schema.validate(&core_tables()).is_empty() {
        InstallState::Fresh
    } else {
        InstallState::Unrecorded {
            detected: detect_core_version(schema),
        }
    }
}

/// Infers the core schema version from the shape of the schema alone.
/// `0.0.0` means not even the initial schema is complete.
pub fn detect_core_version(schema: &SchemaSnapshot) -> Version {
    let validation = schema.validate(&core_tables());
    if !validation.missing_tables.is_empty() {
        return Version::new(0, 0, 0);
    }
    if schema.column("propertyData", "segment").is_none() {
        return Version::new(1, 0, 0);
    }

    let iso_code_width = schema
        .column("language", "isoCode")
        .and_then(|column| column.column_type.width());
    if !matches!(iso_code_width, Some(width) if width >= ISO_CODE_WIDTH) {
        return Version::new(1, 1, 0);
    }

    if !validation.is_valid() {
        return Version::new(1, 2, 0);
    }
    Version::new(1, 3, 0)
}

#[cfg(test)]
mod tests {
    use ledger::{Ledger, LedgerEntry, MemoryLedger};
    use schema::{Dialect, MemoryDatabase, Statement};

    use super::*;
    use crate::{core_catalog, MigrationRunner};

    #[test]
    fn fresh() {
        let state = core_install_state(&SchemaSnapshot::default(), &LedgerState::default());
        assert!(state.is_fresh());
        assert_eq!(detect_core_version(&SchemaSnapshot::default()), Version::new(0, 0, 0));
    }

    #[test]
    fn recorded() {
        let mut db = MemoryDatabase::new(Dialect::strict());
        let mut ledger = MemoryLedger::default();
        MigrationRunner
            .run(&core_catalog(), &mut db, &mut ledger)
            .unwrap();

        let state = LedgerState::new(ledger.entries().unwrap());
        assert_eq!(
            core_install_state(db.snapshot(), &state),
            InstallState::Recorded {
                version: Version::new(1, 3, 0)
            }
        );
        assert_eq!(detect_core_version(db.snapshot()), Version::new(1, 3, 0));
    }

    #[test]
    fn unrecorded() {
        let mut db = MemoryDatabase::new(Dialect::strict());
        let mut ledger = MemoryLedger::default();
        MigrationRunner
            .run(&core_catalog(), &mut db, &mut ledger)
            .unwrap();

        // another plan's entries do not count for the core plan
        let state = LedgerState::new(vec![LedgerEntry::new(
            "forms",
            "AddFormsTable",
            Version::new(1, 0, 0),
        )]);
        assert_eq!(
            core_install_state(db.snapshot(), &state),
            InstallState::Unrecorded {
                detected: Version::new(1, 3, 0)
            }
        );

        let mut schema = db.snapshot().clone();
        schema
            .apply(
                &Statement::DropColumn {
                    table: "propertyData".to_string(),
                    column: "segment".to_string(),
                },
                &Dialect::lenient(),
            )
            .unwrap();
        assert_eq!(detect_core_version(&schema), Version::new(1, 0, 0));
    }
}
