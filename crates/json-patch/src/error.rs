use json_path::{JsonPath, JsonPointer, ParseJsonPathError};

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("path matched nothing: {path}")]
    NoMatch { path: JsonPath },
    #[error("path is ambiguous: {path} matched {count} locations")]
    Ambiguous { path: JsonPath, count: usize },
    #[error("invalid index: {index}")]
    InvalidIndex { path: JsonPointer, index: usize },
    #[error("not a container: {path}")]
    NotAContainer { path: JsonPointer },
    #[error("cannot remove the document root")]
    RemoveRoot,
    #[error("test failed: {path}")]
    TestFailed { path: JsonPath },
    #[error("operation requires a value")]
    MissingValue,
    #[error(transparent)]
    InvalidPath(#[from] ParseJsonPathError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
