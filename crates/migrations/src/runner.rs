use ledger::{Ledger, LedgerEntry, LedgerState};
use schema::Database;
use semver::Version;

use crate::{
    MigrationCatalog, MigrationContext, MigrationError, MigrationReport, MigrationRunError,
    MigrationStep, PostMigration, StepOutcome, StepState,
};

#[derive(Debug, Default, Copy, Clone)]
pub struct MigrationRunner;

impl MigrationRunner {
    /// Runs every step of `catalog` that the ledger has no record of, then
    /// the catalog's post-migrations if any step completed.
    pub fn run(
        &self,
        catalog: &MigrationCatalog,
        db: &mut dyn Database,
        ledger: &mut dyn Ledger,
    ) -> Result<MigrationReport, MigrationRunError> {
        let state = LedgerState::new(ledger.entries()?);
        let plan = catalog.plan();
        let steps = catalog
            .ordered()
            .into_iter()
            .map(|(version, step)| (version, step, state.contains(plan, step.name())))
            .collect();
        let report = run_steps(plan, steps, state, db, ledger)?;
        run_post_migrations(catalog, db, report)
    }

    /// Runs the steps of a package plan whose version is above the highest
    /// version the ledger has recorded for the package.
    pub fn run_package(
        &self,
        catalog: &MigrationCatalog,
        db: &mut dyn Database,
        ledger: &mut dyn Ledger,
    ) -> Result<MigrationReport, MigrationRunError> {
        catalog.check_unique_versions()?;

        let state = LedgerState::new(ledger.entries()?);
        let plan = catalog.plan();
        let highest = state.highest_version(plan)?;
        tracing::info!(
            plan,
            highest = ?highest.as_ref().map(ToString::to_string),
            "package migration state"
        );

        let steps = catalog
            .ordered()
            .into_iter()
            .map(|(version, step)| {
                let applied = highest.as_ref().map_or(false, |highest| version <= highest);
                (version, step, applied)
            })
            .collect();
        let report = run_steps(plan, steps, state, db, ledger)?;
        run_post_migrations(catalog, db, report)
    }
}

fn run_steps(
    plan: &str,
    steps: Vec<(&Version, &dyn MigrationStep, bool)>,
    mut state: LedgerState,
    db: &mut dyn Database,
    ledger: &mut dyn Ledger,
) -> Result<MigrationReport, MigrationRunError> {
    let mut report = MigrationReport {
        plan: plan.to_string(),
        steps: steps
            .iter()
            .map(|(version, step, applied)| StepOutcome {
                name: step.name().to_string(),
                version: (*version).clone(),
                state: if *applied {
                    StepState::AlreadyApplied
                } else {
                    StepState::Pending
                },
            })
            .collect(),
        post_migrations: Vec::new(),
    };

    for (idx, (version, step, applied)) in steps.into_iter().enumerate() {
        if applied {
            continue;
        }

        report.steps[idx].state = StepState::Running;
        match run_step(plan, version, step, &state, db) {
            Ok(false) => {
                tracing::info!(
                    plan,
                    name = step.name(),
                    version = %version,
                    "migration not required"
                );
                report.steps[idx].state = StepState::NotRequired;
            }
            Ok(true) => {
                let entry = LedgerEntry::new(plan, step.name(), version.clone());
                if let Err(err) = ledger.record(entry.clone()) {
                    report.steps[idx].state = StepState::Failed;
                    return Err(step_failed(plan, version, step, report, err.into()));
                }
                state.push(entry);
                tracing::info!(
                    plan,
                    name = step.name(),
                    version = %version,
                    "migration completed"
                );
                report.steps[idx].state = StepState::Completed;
            }
            Err(err) => {
                report.steps[idx].state = StepState::Failed;
                return Err(step_failed(plan, version, step, report, err));
            }
        }
    }

    Ok(report)
}

fn run_post_migrations(
    catalog: &MigrationCatalog,
    db: &mut dyn Database,
    mut report: MigrationReport,
) -> Result<MigrationReport, MigrationRunError> {
    if report.completed().next().is_none() {
        return Ok(report);
    }

    for post in catalog.post_migrations() {
        tracing::info!(plan = catalog.plan(), name = post.name(), "post-migration running");
        if let Err(source) = post.run(db, &report) {
            tracing::error!(
                plan = catalog.plan(),
                name = post.name(),
                error = %source,
                "post-migration failed"
            );
            return Err(MigrationRunError::PostMigrationFailed {
                plan: catalog.plan().to_string(),
                name: post.name().to_string(),
                report,
                source,
            });
        }
        report.post_migrations.push(post.name().to_string());
    }
    Ok(report)
}

/// Returns `false` if the step decided it had nothing to do.
fn run_step(
    plan: &str,
    version: &Version,
    step: &dyn MigrationStep,
    state: &LedgerState,
    db: &mut dyn Database,
) -> Result<bool, MigrationError> {
    let mut ctx = MigrationContext::new(db, state, plan, version);
    if !step.requires_execution(&mut ctx)? {
        return Ok(false);
    }
    tracing::info!(plan, name = step.name(), version = %version, "migration running");
    step.migrate(&mut ctx)?;
    Ok(true)
}

fn step_failed(
    plan: &str,
    version: &Version,
    step: &dyn MigrationStep,
    report: MigrationReport,
    source: MigrationError,
) -> MigrationRunError {
    tracing::error!(
        plan,
        name = step.name(),
        version = %version,
        error = %source,
        "migration failed"
    );
    MigrationRunError::StepFailed {
        plan: plan.to_string(),
        name: step.name().to_string(),
        version: version.clone(),
        report,
        source,
    }
}
