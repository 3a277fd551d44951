use std::sync::Arc;

use content::{DocumentPatcher, MemoryContentStore};
use ledger::LedgerEntry;
use migrations::{InstallState, MigrationReport};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) store: Arc<MemoryContentStore>,
    pub(crate) patcher: Arc<DocumentPatcher>,
    pub(crate) install: Arc<InstallState>,
    pub(crate) entries: Arc<Vec<LedgerEntry>>,
    pub(crate) last_run: Arc<MigrationReport>,
}
