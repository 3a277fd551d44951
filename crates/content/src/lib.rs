mod attempt;
mod error;
mod model;
mod patcher;
mod service;

pub use attempt::Attempt;
pub use error::{PatchError, PatchStatus};
pub use model::{
    Content, ContentUpdateModel, ContentVariant, Property, PropertyValue, ReferenceById,
    ValueModel, VariantModel,
};
pub use patcher::DocumentPatcher;
pub use service::{
    ContentPresentationFactory, ContentService, MemoryContentStore, UpdateModelFactory,
};
