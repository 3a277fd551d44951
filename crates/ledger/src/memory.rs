use crate::{Ledger, LedgerEntry, LedgerError};

#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }
}

impl Ledger for MemoryLedger {
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.entries.clone())
    }

    fn record(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.entries.push(entry);
        Ok(())
    }
}
