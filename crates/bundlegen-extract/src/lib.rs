//! Descriptor extraction and the bundle generation pipeline
//!
//! Plugin manifests are evaluated by an external interpreter, which prints
//! bundle descriptors as JSON. [`pipeline::generate`] ties scanning,
//! extraction, validation and aggregation together.

pub mod errors;
pub mod extractor;
pub mod module_id;
pub mod pipeline;
pub mod process;

#[cfg(all(test, unix))]
mod test_support;

pub use errors::ExtractError;
pub use extractor::{Extract, InterpreterExtractor};
pub use module_id::module_identifier;
pub use pipeline::{
    canonical_base_dir, canonical_roots, config_alias_resolver, generate, generate_with_config,
    run_pipeline, PipelineSettings,
};
pub use process::Invocation;
