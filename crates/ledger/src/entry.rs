use std::collections::HashSet;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct LedgerEntry {
    /// `core` or the name of the package owning the migration.
    pub plan: String,
    pub name: String,
    pub version: Version,
    pub executed_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(plan: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        Self {
            plan: plan.into(),
            name: name.into(),
            version,
            executed_at: Utc::now(),
        }
    }
}

/// An in-memory view of the ledger taken at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    entries: Vec<LedgerEntry>,
}

impl LedgerState {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entries_for<'a>(&'a self, plan: &'a str) -> impl Iterator<Item = &'a LedgerEntry> {
        self.entries.iter().filter(move |entry| entry.plan == plan)
    }

    pub fn contains(&self, plan: &str, name: &str) -> bool {
        self.entries_for(plan).any(|entry| entry.name == name)
    }

    /// The highest version recorded for `plan`.
    ///
    /// Two entries at the same version (e.g. left behind by a crashed run) make
    /// the answer ambiguous and are reported as an error.
    pub fn highest_version(&self, plan: &str) -> Result<Option<Version>, LedgerError> {
        let mut seen = HashSet::new();
        let mut highest: Option<&Version> = None;

        for entry in self.entries_for(plan) {
            if !seen.insert(&entry.version) {
                return Err(LedgerError::DuplicateVersion {
                    plan: plan.to_string(),
                    version: entry.version.clone(),
                });
            }
            if highest.map_or(true, |highest| entry.version > *highest) {
                highest = Some(&entry.version);
            }
        }

        Ok(highest.cloned())
    }

    pub fn push(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(entries: &[(&str, &str, &str)]) -> LedgerState {
        LedgerState::new(
            entries
                .iter()
                .map(|(plan, name, version)| {
                    LedgerEntry::new(*plan, *name, Version::parse(version).unwrap())
                })
                .collect(),
        )
    }

    #[test]
    fn contains() {
        let state = state(&[("core", "CreateInitialSchema", "1.0.0")]);
        assert!(state.contains("core", "CreateInitialSchema"));
        assert!(!state.contains("forms", "CreateInitialSchema"));
        assert!(!state.contains("core", "AddPropertyDataSegment"));
    }

    #[test]
    fn highest_version() {
        let state = state(&[
            ("forms", "AddFormsTable", "1.0.0"),
            ("forms", "AddFieldTable", "1.2.0"),
            ("forms", "AddIndexes", "1.10.0"),
            ("core", "CreateInitialSchema", "2.0.0"),
        ]);
        assert_eq!(
            state.highest_version("forms").unwrap(),
            Some(Version::new(1, 10, 0))
        );
        assert_eq!(state.highest_version("unknown").unwrap(), None);
    }

    #[test]
    fn duplicate_version_is_an_error() {
        let state = state(&[
            ("forms", "AddFormsTable", "1.0.0"),
            ("forms", "AddFormsTableRetry", "1.0.0"),
        ]);
        assert!(matches!(
            state.highest_version("forms"),
            Err(LedgerError::DuplicateVersion { ref plan, ref version })
                if plan == "forms" && *version == Version::new(1, 0, 0)
        ));
    }
}
