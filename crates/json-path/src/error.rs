#[derive(Debug, thiserror::Error, Copy, Clone, Eq, PartialEq)]
#[error("invalid json path at offset {offset}")]
pub struct ParseJsonPathError {
    pub offset: usize,
}
