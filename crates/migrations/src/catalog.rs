use std::collections::HashSet;

use semver::Version;

use crate::{MigrationRunError, MigrationStep, PostMigration};

pub const CORE_PLAN: &str = "core";

/// The steps of one plan, each tagged with the schema version it targets.
pub struct MigrationCatalog {
    plan: String,
    steps: Vec<(Version, Box<dyn MigrationStep>)>,
    post_migrations: Vec<Box<dyn PostMigration>>,
}

impl MigrationCatalog {
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            steps: Vec::new(),
            post_migrations: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(mut self, version: Version, step: impl MigrationStep + 'static) -> Self {
        self.steps.push((version, Box::new(step)));
        self
    }

    #[must_use]
    pub fn post_migration(mut self, post_migration: impl PostMigration + 'static) -> Self {
        self.post_migrations.push(Box::new(post_migration));
        self
    }

    #[inline]
    pub fn post_migrations(&self) -> impl Iterator<Item = &dyn PostMigration> {
        self.post_migrations.iter().map(|post| post.as_ref())
    }

    #[inline]
    pub fn plan(&self) -> &str {
        &self.plan
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps ordered by version, then by declaration order.
    pub fn ordered(&self) -> Vec<(&Version, &dyn MigrationStep)> {
        let mut steps = self
            .steps
            .iter()
            .map(|(version, step)| (version, step.as_ref()))
            .collect::<Vec<_>>();
        steps.sort_by(|(a, _), (b, _)| a.cmp(b));
        steps
    }

    /// Package plans are tracked by version alone, so every step needs its own.
    pub fn check_unique_versions(&self) -> Result<(), MigrationRunError> {
        let mut seen = HashSet::new();
        for (version, _) in &self.steps {
            if !seen.insert(version) {
                return Err(MigrationRunError::DuplicateVersion {
                    plan: self.plan.clone(),
                    version: version.clone(),
                });
            }
        }
        Ok(())
    }
}
