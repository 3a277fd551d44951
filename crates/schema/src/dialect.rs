use serde::{Deserialize, Serialize};

/// How picky the target database is about DDL.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    /// `ADD COLUMN` of an existing column is an error rather than a no-op.
    pub rejects_duplicate_columns: bool,
    pub rejects_altering_referenced_columns: bool,
    pub rejects_altering_indexed_columns: bool,
}

impl Dialect {
    pub const fn strict() -> Self {
        Self {
            rejects_duplicate_columns: true,
            rejects_altering_referenced_columns: true,
            rejects_altering_indexed_columns: true,
        }
    }

    pub const fn lenient() -> Self {
        Self {
            rejects_duplicate_columns: false,
            rejects_altering_referenced_columns: false,
            rejects_altering_indexed_columns: false,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::strict()
    }
}
