mod error;
mod evaluator;
mod patch;

pub use error::ApplyError;
pub use evaluator::JsonPathEvaluator;
pub use patch::{ContentPatchRequest, PatchKind, PatchOperation};
