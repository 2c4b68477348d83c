#![deny(missing_docs)]
#![doc = "Experiment configuration, canonical naming and shared error types for denoiser evaluation."]

pub mod codec;
pub mod config;
pub mod context;
pub mod errors;
pub mod measure;
pub mod metadata;
pub mod serde;

pub use codec::{decode, encode, encode_sampling, reference_name, unfiltered_reference_name, CanonicalName, PartialConfig};
pub use config::{
    AdaptiveSampling, ExperimentConfig, ExperimentConfigBuilder, FoveaMovePattern, FoveaMovement,
    FoveaShape, FoveatedSampling, NormalizationMode, SamplingDescriptor, SelectionMode,
};
pub use context::{load_context, SweepContext};
pub use errors::{DwError, ErrorInfo};
pub use measure::{Device, ErrorKind, Field, RefFilterMode, VariantFlags};
pub use metadata::{check_metadata, load_metadata, store_metadata, RunMetadata, METADATA_FILE};
