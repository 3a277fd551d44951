use ledger::LedgerEntry;
use migrations::{InstallState, MigrationReport};
use poem::{
    handler,
    web::{Data, Json},
};
use serde::Serialize;

use crate::state::State;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MigrationsResponse {
    install: InstallState,
    entries: Vec<LedgerEntry>,
    last_run: MigrationReport,
}

#[handler]
pub(crate) async fn handler_migrations(state: Data<&State>) -> Json<MigrationsResponse> {
    Json(MigrationsResponse {
        install: state.install.as_ref().clone(),
        entries: state.entries.as_ref().clone(),
        last_run: state.last_run.as_ref().clone(),
    })
}
