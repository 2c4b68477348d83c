//! Vocabulary of the error pipeline shared by the metric engine, the result
//! cache and the aggregator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-pixel error function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Sum of absolute channel differences.
    L1,
    /// Euclidean norm of the channel differences.
    L2,
    /// Squared error relative to the squared reference.
    #[serde(rename = "RelMSE", alias = "RelMse")]
    RelMse,
}

impl ErrorKind {
    /// Every kind in declaration order.
    pub const ALL: [ErrorKind; 3] = [ErrorKind::L1, ErrorKind::L2, ErrorKind::RelMse];

    /// Name used in sidecar files and table headers.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::L1 => "L1",
            ErrorKind::L2 => "L2",
            ErrorKind::RelMse => "RelMSE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar extracted from one frame's error map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Mean error.
    Mean,
    /// 25th percentile.
    P25,
    /// Median.
    P50,
    /// 75th percentile.
    P75,
    /// 99th percentile.
    P99,
    /// Mean of the values above the 99th percentile.
    Top1Percent,
    /// Structural similarity of the tone-mapped frames.
    Ssim,
}

impl Field {
    /// Every field in report order.
    pub const ALL: [Field; 7] = [
        Field::Mean,
        Field::P25,
        Field::P50,
        Field::P75,
        Field::P99,
        Field::Top1Percent,
        Field::Ssim,
    ];

    /// File stem used for sidecars and table sections.
    pub fn stem(self) -> &'static str {
        match self {
            Field::Mean => "mean",
            Field::P25 => "25-th percentile",
            Field::P50 => "50-th percentile",
            Field::P75 => "75-th percentile",
            Field::P99 => "99-th percentile",
            Field::Top1Percent => "top-1-percent",
            Field::Ssim => "ssim",
        }
    }

    /// Percentile rank in `[0, 100]` for the percentile fields.
    pub fn percentile(self) -> Option<f64> {
        match self {
            Field::P25 => Some(25.0),
            Field::P50 => Some(50.0),
            Field::P75 => Some(75.0),
            Field::P99 => Some(99.0),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Filtering applied to the reference sequence before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefFilterMode {
    /// Reference used as rendered.
    #[default]
    None,
    /// Temporally filtered reference.
    Temporal,
    /// Spatially filtered reference.
    Spatial,
    /// Spatially and temporally filtered reference.
    SpatialTemporal,
}

impl RefFilterMode {
    /// Upper-case name written into sidecar file names.
    pub fn name(self) -> &'static str {
        match self {
            RefFilterMode::None => "NONE",
            RefFilterMode::Temporal => "TEMPORAL",
            RefFilterMode::Spatial => "SPATIAL",
            RefFilterMode::SpatialTemporal => "SPATIAL_TEMPORAL",
        }
    }
}

/// Variant switches that select a distinct cache entry for the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct VariantFlags {
    /// Restrict reductions to the foveal region.
    #[serde(default)]
    pub fovea: bool,
    /// Reference filtering mode.
    #[serde(default)]
    pub ref_filter: RefFilterMode,
    /// Use the uniform 7x7 SSIM window.
    #[serde(default)]
    pub fast: bool,
    /// Compare against the unfiltered reference.
    #[serde(default)]
    pub no_filter_reference: bool,
}

/// Numeric backend selected once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Sequential CPU loops.
    #[default]
    Cpu,
    /// Rayon data-parallel loops.
    Parallel,
}
