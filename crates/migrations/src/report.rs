use semver::Version;
use serde::Serialize;

#[derive(Debug, Copy, Clone, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum StepState {
    Pending,
    Running,
    Completed,
    Failed,
    /// Recorded in the ledger by an earlier run.
    AlreadyApplied,
    /// `requires_execution` returned `false`.
    NotRequired,
}

#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub name: String,
    pub version: Version,
    pub state: StepState,
}

#[derive(Debug, Clone, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub plan: String,
    pub steps: Vec<StepOutcome>,
    /// Post-migrations that ran to completion, in order.
    pub post_migrations: Vec<String>,
}

impl MigrationReport {
    pub fn state_of(&self, name: &str) -> Option<StepState> {
        self.steps
            .iter()
            .find(|step| step.name == name)
            .map(|step| step.state)
    }

    /// Names of the steps that ran to completion, in order.
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|step| step.state == StepState::Completed)
            .map(|step| step.name.as_str())
    }
}
