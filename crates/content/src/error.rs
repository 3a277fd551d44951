use json_patch::{ApplyError, PatchKind};
use json_path::ParseJsonPathError;
use serde::Serialize;
use uuid::Uuid;

/// The status reported to callers of the document patcher.
///
/// Syntax errors, inapplicable operations and invalid results all collapse
/// into `InvalidOperation`; the detail is available from [`PatchError`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatchStatus {
    Success,
    NotFound,
    InvalidOperation,
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("operation {index} has an invalid path `{path}`: {source}")]
    InvalidPath {
        index: usize,
        path: String,
        source: ParseJsonPathError,
    },
    #[error("operation {index} ({kind}) requires a value")]
    MissingValue { index: usize, kind: PatchKind },
    #[error("operation {index} targets culture `{culture}` which the request does not declare")]
    UndeclaredCulture { index: usize, culture: String },
    #[error("operation {index} targets segment `{segment}` which the request does not declare")]
    UndeclaredSegment { index: usize, segment: String },
    #[error("operation {index} changed a value of {field} `{value}` which the request does not declare")]
    UndeclaredChange {
        index: usize,
        field: &'static str,
        value: String,
    },
    #[error("content not found: {key}")]
    NotFound { key: Uuid },
    #[error("operation {index} ({kind}) could not be applied: {source}")]
    Inapplicable {
        index: usize,
        kind: PatchKind,
        source: ApplyError,
    },
    #[error("failed to serialize content: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("patched document is not a valid update model: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl PatchError {
    pub fn status(&self) -> PatchStatus {
        match self {
            PatchError::NotFound { .. } => PatchStatus::NotFound,
            _ => PatchStatus::InvalidOperation,
        }
    }

    /// Errors raised before any content was loaded.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PatchError::InvalidPath { .. }
                | PatchError::MissingValue { .. }
                | PatchError::UndeclaredCulture { .. }
                | PatchError::UndeclaredSegment { .. }
        )
    }
}
