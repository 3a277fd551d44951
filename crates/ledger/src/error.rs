use semver::Version;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("block file is full")]
    BlockFileIsFull,
    #[error("plan `{plan}` has more than one ledger entry at version {version}")]
    DuplicateVersion { plan: String, version: Version },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
