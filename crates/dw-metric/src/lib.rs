#![doc = "Error metric engine: per-pixel error maps, frame reductions, tone-mapped SSIM and foveal masks."]

pub mod backend;
pub mod engine;
pub mod fovea;
pub mod report;
pub mod ssim;
pub mod tonemap;

pub use backend::{backend_for, CpuBackend, NumericBackend, ParallelBackend, SUM_CHUNK};
pub use dw_core::measure::{ErrorKind, Field};
pub use engine::{ErrorMap, MetricEngine, REL_MSE_EPSILON};
pub use fovea::{fovea_mask, Mask};
pub use report::FrameReport;
pub use ssim::SsimWindow;
