use std::path::Path;

use content::Content;
use ledger::{FileLedger, Ledger, LedgerEntry, LedgerState, MemoryLedger};
use migrations::{core_catalog, core_install_state, InstallState, MigrationReport, MigrationRunner};
use schema::{Dialect, MemoryDatabase, SchemaSnapshot};

use crate::error::ServerError;

const LEDGER_DIR_NAME: &str = "ledger";
const SCHEMA_FILE_NAME: &str = "schema.json";
const TEMP_SCHEMA_FILE_NAME: &str = "schema.temp";

/// The outcome of the startup migration.
///
/// The ledger only changes while migrating, so its entries are read once
/// here and served from memory afterwards.
pub(crate) struct Migrated {
    /// What the database held before the run.
    pub(crate) install: InstallState,
    pub(crate) entries: Vec<LedgerEntry>,
    pub(crate) report: MigrationReport,
}

/// Brings the schema up to date with the core plan.
///
/// The schema is written back even when a step fails, because the steps
/// before it are already in the ledger.
pub(crate) fn migrate(data_dir: Option<&Path>) -> Result<Migrated, ServerError> {
    match data_dir {
        Some(data_dir) => {
            std::fs::create_dir_all(data_dir)?;
            let mut ledger = FileLedger::open(data_dir.join(LEDGER_DIR_NAME))?;
            let mut db = MemoryDatabase::from_snapshot(load_schema(data_dir)?, Dialect::strict());
            let res = run(&mut db, &mut ledger);
            save_schema(data_dir, db.snapshot())?;
            res
        }
        None => run(
            &mut MemoryDatabase::new(Dialect::strict()),
            &mut MemoryLedger::default(),
        ),
    }
}

fn run(db: &mut MemoryDatabase, ledger: &mut dyn Ledger) -> Result<Migrated, ServerError> {
    let install = core_install_state(db.snapshot(), &LedgerState::new(ledger.entries()?));
    tracing::info!(install = ?install, "core install state");

    let report = MigrationRunner.run(&core_catalog(), db, ledger)?;
    log_report(&report);
    Ok(Migrated {
        install,
        entries: ledger.entries()?,
        report,
    })
}

pub(crate) fn load_content(path: &Path) -> Result<Vec<Content>, ServerError> {
    let items: Vec<Content> = serde_json::from_slice(&std::fs::read(path)?)?;
    tracing::info!(path = %path.display(), items = items.len(), "content loaded");
    Ok(items)
}

fn log_report(report: &MigrationReport) {
    tracing::info!(
        plan = report.plan.as_str(),
        steps = report.steps.len(),
        completed = report.completed().count(),
        post_migrations = report.post_migrations.len(),
        "migrations finished"
    );
}

fn load_schema(data_dir: &Path) -> Result<SchemaSnapshot, ServerError> {
    let path = data_dir.join(SCHEMA_FILE_NAME);
    if !path.exists() {
        return Ok(SchemaSnapshot::default());
    }
    Ok(serde_json::from_slice(&std::fs::read(path)?)?)
}

fn save_schema(data_dir: &Path, schema: &SchemaSnapshot) -> Result<(), ServerError> {
    let data = serde_json::to_vec(schema)?;
    std::fs::write(data_dir.join(TEMP_SCHEMA_FILE_NAME), data)?;
    std::fs::rename(
        data_dir.join(TEMP_SCHEMA_FILE_NAME),
        data_dir.join(SCHEMA_FILE_NAME),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use migrations::StepState;

    use super::*;

    #[test]
    fn migrate_persists_between_starts() {
        let dir = tempfile::tempdir().unwrap();

        let migrated = migrate(Some(dir.path())).unwrap();
        assert!(migrated.install.is_fresh());
        assert_eq!(migrated.report.completed().count(), 3);
        assert_eq!(migrated.report.post_migrations, vec!["UpdateStatistics"]);
        assert_eq!(migrated.entries.len(), 3);
        assert!(dir.path().join(SCHEMA_FILE_NAME).exists());
        assert!(!dir.path().join(TEMP_SCHEMA_FILE_NAME).exists());

        let schema = load_schema(dir.path()).unwrap();
        assert!(schema.table_exists("propertyData"));

        let migrated = migrate(Some(dir.path())).unwrap();
        assert_eq!(
            migrated.install,
            InstallState::Recorded {
                version: semver::Version::new(1, 3, 0)
            }
        );
        assert_eq!(migrated.report.completed().count(), 0);
        assert!(migrated.report.post_migrations.is_empty());
        assert_eq!(
            migrated.report.state_of("CreateInitialSchema"),
            Some(StepState::AlreadyApplied)
        );
        assert_eq!(migrated.entries.len(), 3);
        assert_eq!(load_schema(dir.path()).unwrap(), schema);
    }

    #[test]
    fn migrate_unrecorded_schema() {
        let dir = tempfile::tempdir().unwrap();
        migrate(Some(dir.path())).unwrap();
        std::fs::remove_dir_all(dir.path().join(LEDGER_DIR_NAME)).unwrap();

        let migrated = migrate(Some(dir.path())).unwrap();
        assert_eq!(
            migrated.install,
            InstallState::Unrecorded {
                detected: semver::Version::new(1, 3, 0)
            }
        );
        // every step finds its change in place
        assert_eq!(migrated.report.completed().count(), 3);
        assert_eq!(migrated.entries.len(), 3);
    }

    #[test]
    fn migrate_in_memory() {
        let migrated = migrate(None).unwrap();
        assert!(migrated.install.is_fresh());
        assert_eq!(migrated.report.completed().count(), 3);
        assert_eq!(migrated.entries.len(), 3);
    }

    #[test]
    fn load_content_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(
            &path,
            r#"[{
                "key": "5f0b3ab4-0d5e-4c47-9f0c-1b2a7f4a9c11",
                "contentType": "page",
                "variants": [{ "name": "Home" }],
                "properties": [{ "alias": "title", "values": [{ "value": "Old Title" }] }]
            }]"#,
        )
        .unwrap();

        let items = load_content(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_type, "page");
        assert!(items[0].property("title").is_some());

        assert!(matches!(
            load_content(&dir.path().join("missing.json")),
            Err(ServerError::Io(_))
        ));
    }
}
