#![doc = "Result cache: per-field error series stored next to each candidate run and reused while newer than both runs' metadata."]

pub mod cache;
pub mod record;
pub mod sidecar;
pub mod state;

pub use cache::{CacheOutcome, ResultCache};
pub use record::{nan_mean, ErrorRecord};
pub use sidecar::{read_sidecar, sidecar_name, sidecar_path, write_sidecar};
pub use state::{cache_state, CacheState};
