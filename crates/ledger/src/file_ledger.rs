use std::path::{Path, PathBuf};

use crate::{
    block_file::{repair_tail, ActiveBlockFile, InactiveBlockFile},
    Ledger, LedgerEntry, LedgerError,
};

const DEFAULT_BLOCK_LIMIT: u64 = 1024 * 1024 * 16;

/// A ledger stored as a directory of numbered `N.block` files, each holding a
/// stream of JSON entries. Entries are only ever appended.
pub struct FileLedger {
    path: PathBuf,
    active_block: Option<(usize, ActiveBlockFile)>,
    block_limit: u64,
}

impl FileLedger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        Self::open_with_block_limit(path, DEFAULT_BLOCK_LIMIT)
    }

    pub fn open_with_block_limit(
        path: impl Into<PathBuf>,
        block_limit: u64,
    ) -> Result<Self, LedgerError> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        let blocks = get_block_list(&path)?;
        tracing::info!(path = %path.display(), blocks = blocks.len(), "open ledger");

        let active_block = match blocks.last().copied() {
            Some(index) => {
                let torn = repair_tail(block_path(&path, index))?;
                if torn > 0 {
                    tracing::warn!(block = index, bytes = torn, "truncated torn ledger entry");
                }
                let active_block = ActiveBlockFile::open(block_path(&path, index), block_limit)?;
                Some((index, active_block))
            }
            None => None,
        };

        Ok(Self {
            path,
            active_block,
            block_limit,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ledger for FileLedger {
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut entries = Vec::new();
        let blocks = get_block_list(&self.path)?;
        let last = blocks.last().copied();

        for index in blocks {
            for res in InactiveBlockFile::open(block_path(&self.path, index))? {
                match res {
                    Ok(entry) => entries.push(entry),
                    // an append to the active block that never completed
                    Err(LedgerError::Json(err)) if Some(index) == last && err.is_eof() => {
                        tracing::warn!(block = index, error = %err, "ignoring torn ledger entry");
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(entries)
    }

    fn record(&mut self, entry: LedgerEntry) -> Result<(), LedgerError> {
        tracing::debug!(
            plan = entry.plan.as_str(),
            name = entry.name.as_str(),
            "record migration"
        );

        let new_index = match &mut self.active_block {
            Some((index, block)) => match block.append(&entry) {
                Ok(()) => return block.flush(),
                Err(LedgerError::BlockFileIsFull) => *index + 1,
                Err(err) => return Err(err),
            },
            None => 1,
        };

        let mut block_file =
            ActiveBlockFile::open(block_path(&self.path, new_index), self.block_limit)?;
        block_file.append(&entry)?;
        block_file.flush()?;
        self.active_block = Some((new_index, block_file));
        Ok(())
    }
}

fn block_path(path: &Path, index: usize) -> PathBuf {
    path.join(format!("{}.block", index))
}

fn get_block_list(path: &Path) -> Result<Vec<usize>, LedgerError> {
    let read_dir = path.read_dir()?;
    let mut blocks = Vec::new();

    for res in read_dir {
        let entry = res?;
        let file_path = entry.path();
        if file_path.extension().and_then(|ext| ext.to_str()) == Some("block") {
            if let Some(index) = file_path
                .file_stem()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<usize>().ok())
            {
                blocks.push(index);
            }
        }
    }

    blocks.sort_unstable();
    Ok(blocks)
}
