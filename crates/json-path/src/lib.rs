mod macros;

mod ast;
mod culture;
mod error;
mod filter;
mod json_path;
mod json_pointer;
mod parser;
mod value_ext;

pub use ast::{CompareOp, FilterExpr, Operand, Segment};
pub use culture::{extract_culture, extract_cultures, extract_segment, extract_segments};
pub use error::ParseJsonPathError;
pub use json_path::{JsonPath, JsonPathRef};
pub use json_pointer::{JsonPointer, PointerSegment};
pub use parser::MAX_FILTER_OPERATORS;
pub use value_ext::ValueExt;
