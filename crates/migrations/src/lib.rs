mod base_data;
mod catalog;
mod context;
mod core_plan;
mod error;
mod install;
mod post_migration;
mod report;
mod runner;
mod step;
pub mod tables;

pub use base_data::base_data;
pub use catalog::{MigrationCatalog, CORE_PLAN};
pub use context::MigrationContext;
pub use core_plan::{
    core_catalog, AddPropertyDataSegment, CreateInitialSchema, RebuildContentNodeIndexes,
    UpdateStatistics, WidenLanguageIsoCode,
};
pub use error::{MigrationError, MigrationRunError};
pub use install::{core_install_state, detect_core_version, InstallState};
pub use post_migration::PostMigration;
pub use report::{MigrationReport, StepOutcome, StepState};
pub use runner::MigrationRunner;
pub use step::MigrationStep;
