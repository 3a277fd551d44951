mod block_file;
mod entry;
mod error;
mod file_ledger;
mod memory;

pub use entry::{LedgerEntry, LedgerState};
pub use error::LedgerError;
pub use file_ledger::FileLedger;
pub use memory::MemoryLedger;

/// Persistent record of the migrations that have run for an installation.
pub trait Ledger {
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    fn record(&mut self, entry: LedgerEntry) -> Result<(), LedgerError>;
}
