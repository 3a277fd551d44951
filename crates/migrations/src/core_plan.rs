use schema::{Database, Statement, Table};
use semver::Version;

use crate::{
    tables::{core_tables, ContentNode, DictionaryValue, Language, PropertyData, ISO_CODE_WIDTH},
    MigrationCatalog, MigrationContext, MigrationError, MigrationReport, MigrationStep,
    PostMigration, CORE_PLAN,
};

/// The migration plan of the core schema.
pub fn core_catalog() -> MigrationCatalog {
    MigrationCatalog::new(CORE_PLAN)
        .step(Version::new(1, 0, 0), CreateInitialSchema)
        .step(Version::new(1, 1, 0), AddPropertyDataSegment)
        .step(Version::new(1, 2, 0), WidenLanguageIsoCode)
        .step(Version::new(1, 3, 0), RebuildContentNodeIndexes)
        .post_migration(UpdateStatistics)
}

pub struct CreateInitialSchema;

impl MigrationStep for CreateInitialSchema {
    fn name(&self) -> &str {
        "CreateInitialSchema"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        if ctx.create_table_if_not_exists::<Language>()? {
            ctx.insert_base_data::<Language>()?;
        }
        if ctx.create_table_if_not_exists::<ContentNode>()? {
            ctx.insert_base_data::<ContentNode>()?;
        }
        ctx.create_table_if_not_exists::<PropertyData>()?;
        ctx.create_table_if_not_exists::<DictionaryValue>()?;
        Ok(())
    }
}

pub struct AddPropertyDataSegment;

impl MigrationStep for AddPropertyDataSegment {
    fn name(&self) -> &str {
        "AddPropertyDataSegment"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let existing = ctx.columns::<PropertyData>()?;
        if ctx.add_column_if_not_exists::<PropertyData>(&existing, "segment")? {
            // the variant key now includes the segment
            ctx.delete_indexes::<PropertyData, _>(["IX_propertyData_variant"])?;
            ctx.create_indexes::<PropertyData, _>(["IX_propertyData_variant"])?;
        }
        Ok(())
    }
}

/// Widens `language.isoCode`, and the dictionary column pointing at it, to
/// hold culture names such as `sr-Latn-CS`.
pub struct WidenLanguageIsoCode;

impl MigrationStep for WidenLanguageIsoCode {
    fn name(&self) -> &str {
        "WidenLanguageIsoCode"
    }

    fn requires_execution(&self, ctx: &mut MigrationContext<'_>) -> Result<bool, MigrationError> {
        let width = ctx
            .schema()?
            .column(&Language::name(), "isoCode")
            .and_then(|column| column.column_type.width());
        Ok(matches!(width, Some(width) if width < ISO_CODE_WIDTH))
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.delete_foreign_key(&DictionaryValue::name(), "FK_dictionaryValue_language")?;
        ctx.delete_indexes::<Language, _>(["IX_language_isoCode"])?;
        ctx.alter_column::<Language>("isoCode")?;
        ctx.alter_column::<DictionaryValue>("languageIsoCode")?;
        ctx.create_indexes::<Language, _>(["IX_language_isoCode"])?;
        ctx.create_foreign_keys::<DictionaryValue, _>(["FK_dictionaryValue_language"])?;
        Ok(())
    }
}

/// Drops every index on `contentNode`, including ones left by older
/// versions, and creates the current set.
pub struct RebuildContentNodeIndexes;

impl MigrationStep for RebuildContentNodeIndexes {
    fn name(&self) -> &str {
        "RebuildContentNodeIndexes"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let existing = ctx
            .schema()?
            .table(&ContentNode::name())
            .map(|table| {
                table
                    .indexes
                    .iter()
                    .map(|index| index.name.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        ctx.delete_indexes::<ContentNode, _>(&existing)?;

        let current = ContentNode::definition()
            .indexes
            .into_iter()
            .map(|index| index.name);
        ctx.create_indexes::<ContentNode, _>(current)?;
        Ok(())
    }
}

/// Refreshes planner statistics of the core tables once their shape changed.
pub struct UpdateStatistics;

impl PostMigration for UpdateStatistics {
    fn name(&self) -> &str {
        "UpdateStatistics"
    }

    fn run(&self, db: &mut dyn Database, report: &MigrationReport) -> Result<(), MigrationError> {
        let schema = db.introspect()?;
        for table in core_tables() {
            if schema.table_exists(&table.name) {
                db.execute(&Statement::Sql(format!("ANALYZE \"{}\"", table.name)))?;
            }
        }
        tracing::info!(
            plan = report.plan.as_str(),
            completed = report.completed().count(),
            "statistics updated"
        );
        Ok(())
    }
}
