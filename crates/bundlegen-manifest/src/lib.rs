//! Bundle manifest discovery and configuration synthesis
//!
//! Plugins announce themselves with a reserved manifest file. This crate
//! finds those files, parses the bundle descriptors an extraction process
//! emits for them, validates each descriptor and aggregates the results into
//! the bundle configurations handed to the downstream bundler.

pub mod aggregate;
pub mod descriptor;
pub mod diagnostics;
pub mod errors;
pub mod registry;
pub mod scanner;
pub mod transform;
pub mod types;

pub use aggregate::BundleAggregator;
pub use descriptor::{
    descriptor_from_value, parse_descriptor_array, parse_descriptor_lines, DescriptorRecord,
};
pub use diagnostics::{ConsoleDiagnostics, Diagnostics, RecordingDiagnostics};
pub use errors::ManifestError;
pub use registry::ExternalsRegistry;
pub use scanner::scan_manifests;
pub use transform::{reject_descriptor, transform_descriptor, TransformOptions, TransformedBundle};
pub use types::{
    BundleConfig, BundleDescriptor, BundleOutput, Externals, ExtractedDescriptors, RejectedDescriptor,
    TrackerConfig,
};
