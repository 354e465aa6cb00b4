//! Generic mutation pipeline: input schema derivation, accumulating
//! validation, and create/update/delete application.

pub mod input;
pub mod pipeline;
pub mod validate;

pub use input::{InputField, InputSchema, MACHINE_MANAGED_FIELDS};
pub use pipeline::{DeleteResult, MutationPipeline, MutationResult};
pub use validate::{FieldError, validate};
