//! Strongly typed experiment configuration.
//!
//! [`ExperimentConfig`] can only be produced by [`ExperimentConfigBuilder::build`],
//! which validates ranges, derives `grad_iters` and resets every field that is
//! irrelevant to the active [`SelectionMode`] to a canonical value. Two built
//! configurations therefore compare equal exactly when their canonical names do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DwError, ErrorInfo};
use crate::serde::extended_f64;

/// Gradient alpha used when the caller leaves it unset.
pub const DEFAULT_GRADIENT_ALPHA: f64 = 0.2;

/// Temporal alpha used when the caller leaves it unset.
pub const DEFAULT_ALPHA: f64 = 0.05;

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical upper-case name used in directory names.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parses a canonical name or a legacy alias (case-insensitive).
            pub fn from_name(text: &str) -> Option<Self> {
                let upper = text.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $($text $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Function mapping a per-pixel gradient signal to the blend ratio between
    /// weighted and unweighted temporal accumulation.
    pub enum SelectionMode {
        /// Plain exponential moving average.
        Unweighted => "UNWEIGHTED",
        /// Sample-count weighted moving average.
        Weighted => "WEIGHTED",
        /// Clamped linear ramp around the midpoint.
        Linear => "LINEAR",
        /// Hard threshold at the midpoint.
        Step => "STEP",
        /// Logistic curve around the midpoint.
        Logistic => "LOGISTIC",
    }
}

named_enum! {
    /// Rescaling applied to the gradient signal before selection.
    pub enum NormalizationMode {
        /// Raw gradient.
        None => "NONE",
        /// Divided by luminance.
        Luminance => "LUMINANCE" | "LUM",
        /// Divided by variance.
        Variance => "VARIANCE" | "VAR",
        /// Divided by standard deviation.
        StandardDeviation => "STANDARD_DEVIATION" | "STD",
        /// Divided by the squared standard deviation estimate.
        Std2 => "STD2",
    }
}

named_enum! {
    /// Shape of the high sample-rate region.
    pub enum FoveaShape {
        /// Same sample count everywhere.
        Uniform => "UNIFORM",
        /// Filled circle.
        Circle => "CIRCLE",
        /// Screen split along a horizontal line.
        SplitHorizontally => "SPLIT_HORIZONTALLY",
        /// Screen split along a vertical line.
        SplitVertically => "SPLIT_VERTICALLY",
    }
}

named_enum! {
    /// Procedural gaze movement.
    pub enum FoveaMovePattern {
        /// Lissajous curve around the screen centre.
        Lissajous => "LISSAJOUS",
        /// Jump between targets and dwell.
        MoveAndStay => "MOVE_AND_STAY",
    }
}

impl SelectionMode {
    /// True for the modes driven by a gradient signal.
    pub fn is_gradient_based(self) -> bool {
        matches!(
            self,
            SelectionMode::Linear | SelectionMode::Step | SelectionMode::Logistic
        )
    }

    /// Token used in canonical names, `None` when the mode emits no token.
    pub fn token(self) -> Option<&'static str> {
        match self {
            SelectionMode::Unweighted => None,
            SelectionMode::Weighted => Some("Weighted"),
            SelectionMode::Linear => Some("Linear"),
            SelectionMode::Step => Some("Step"),
            SelectionMode::Logistic => Some("Logistic"),
        }
    }
}

/// Gaze trajectory of a foveated run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum FoveaMovement {
    /// `centre + radius * sin(2*pi*freq*t + phase)` per axis.
    Lissajous {
        /// Frequencies in Hz for x and y.
        freq: [f64; 2],
        /// Amplitudes in pixels for x and y.
        radius: [f64; 2],
        /// Phase offsets in radians for x and y.
        phase: [f64; 2],
    },
    /// Move at `speed` pixels per second, then stay for `stay_duration` seconds.
    MoveAndStay {
        /// Pixels per second.
        speed: f64,
        /// Seconds spent at each target.
        stay_duration: f64,
    },
}

impl FoveaMovement {
    /// The renderer's default Lissajous trajectory for a 1280x720 target.
    pub fn default_lissajous() -> Self {
        FoveaMovement::Lissajous {
            freq: [0.4, 0.5],
            radius: [640.0, 360.0],
            phase: [std::f64::consts::FRAC_PI_2, 0.0],
        }
    }

    /// Pattern discriminant.
    pub fn pattern(&self) -> FoveaMovePattern {
        match self {
            FoveaMovement::Lissajous { .. } => FoveaMovePattern::Lissajous,
            FoveaMovement::MoveAndStay { .. } => FoveaMovePattern::MoveAndStay,
        }
    }
}

/// Foveated sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoveatedSampling {
    /// Region shape.
    pub shape: FoveaShape,
    /// Circle radius in pixels; only meaningful for [`FoveaShape::Circle`].
    pub radius: f64,
    /// Samples per pixel inside the fovea.
    pub sample_count: f64,
    /// Gaze trajectory.
    pub movement: FoveaMovement,
}

/// Variance driven adaptive sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSampling {
    /// Average samples per pixel budget.
    pub budget: f64,
    /// Lower variance bound.
    pub min_variance: f64,
    /// Upper variance bound.
    pub max_variance: f64,
    /// Minimum samples per pixel.
    pub min_spp: f64,
    /// Maximum samples per pixel.
    pub max_spp: f64,
}

/// Sampling strategy of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SamplingDescriptor {
    /// Uniform sampling; no name token.
    #[default]
    None,
    /// Foveated sampling.
    Foveated(FoveatedSampling),
    /// Adaptive sampling.
    Adaptive(AdaptiveSampling),
}

/// Immutable, validated experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ConfigRecord", try_from = "ConfigRecord")]
pub struct ExperimentConfig {
    scene_name: String,
    iters: u32,
    feedback: i32,
    grad_iters: u32,
    alpha: f64,
    weighted_alpha: f64,
    gradient_alpha: f64,
    selection_mode: SelectionMode,
    midpoint: f64,
    steepness: f64,
    normalization_mode: NormalizationMode,
    sampling: SamplingDescriptor,
    filter_gradient: bool,
    best_gamma: bool,
    debug: bool,
}

impl ExperimentConfig {
    /// Starts a builder for `scene_name` with the given selection mode.
    pub fn builder(scene_name: impl Into<String>, mode: SelectionMode) -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::new(scene_name, mode)
    }

    /// Scene the frames were rendered from.
    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Spatial filter iterations.
    pub fn iters(&self) -> u32 {
        self.iters
    }

    /// Feedback tap (`-1` disables feedback).
    pub fn feedback(&self) -> i32 {
        self.feedback
    }

    /// Gradient filter iterations, derived from the selection mode.
    pub fn grad_iters(&self) -> u32 {
        self.grad_iters
    }

    /// Decay rate of the unweighted accumulator.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Decay rate of the weighted accumulator.
    pub fn weighted_alpha(&self) -> f64 {
        self.weighted_alpha
    }

    /// Decay rate of the gradient accumulator.
    pub fn gradient_alpha(&self) -> f64 {
        self.gradient_alpha
    }

    /// Active selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    /// Selection function threshold.
    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    /// Selection function sharpness (`+inf` for step-like modes).
    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    /// Gradient normalization.
    pub fn normalization_mode(&self) -> NormalizationMode {
        self.normalization_mode
    }

    /// Sampling strategy.
    pub fn sampling(&self) -> &SamplingDescriptor {
        &self.sampling
    }

    /// Whether the gradient is spatially filtered.
    pub fn filter_gradient(&self) -> bool {
        self.filter_gradient
    }

    /// Whether the closed-form blend ratio replaces the selection function.
    pub fn best_gamma(&self) -> bool {
        self.best_gamma
    }

    /// Whether debug outputs were enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Pivot-table coordinates `(steepness, midpoint)` of this configuration.
    pub fn table_coordinates(&self) -> (f64, f64) {
        (self.steepness, self.midpoint)
    }

    /// Returns a builder pre-populated with this configuration.
    pub fn to_builder(&self) -> ExperimentConfigBuilder {
        ExperimentConfigBuilder {
            scene_name: self.scene_name.clone(),
            selection_mode: self.selection_mode,
            iters: self.iters,
            feedback: self.feedback,
            grad_iters: Some(self.grad_iters),
            alpha: self.alpha,
            weighted_alpha: Some(self.weighted_alpha),
            gradient_alpha: Some(self.gradient_alpha),
            midpoint: Some(self.midpoint),
            steepness: Some(self.steepness),
            normalization_mode: self.normalization_mode,
            sampling: self.sampling,
            filter_gradient: self.filter_gradient,
            best_gamma: self.best_gamma,
            debug: self.debug,
        }
    }
}

/// Builder and normalizer for [`ExperimentConfig`].
#[derive(Debug, Clone)]
pub struct ExperimentConfigBuilder {
    scene_name: String,
    selection_mode: SelectionMode,
    iters: u32,
    feedback: i32,
    grad_iters: Option<u32>,
    alpha: f64,
    weighted_alpha: Option<f64>,
    gradient_alpha: Option<f64>,
    midpoint: Option<f64>,
    steepness: Option<f64>,
    normalization_mode: NormalizationMode,
    sampling: SamplingDescriptor,
    filter_gradient: bool,
    best_gamma: bool,
    debug: bool,
}

impl ExperimentConfigBuilder {
    /// Creates a builder with renderer defaults.
    pub fn new(scene_name: impl Into<String>, mode: SelectionMode) -> Self {
        Self {
            scene_name: scene_name.into(),
            selection_mode: mode,
            iters: 0,
            feedback: -1,
            grad_iters: None,
            alpha: DEFAULT_ALPHA,
            weighted_alpha: None,
            gradient_alpha: None,
            midpoint: None,
            steepness: None,
            normalization_mode: NormalizationMode::None,
            sampling: SamplingDescriptor::None,
            filter_gradient: false,
            best_gamma: false,
            debug: false,
        }
    }

    /// Sets the spatial filter iterations and feedback tap.
    pub fn iters(mut self, iters: u32, feedback: i32) -> Self {
        self.iters = iters;
        self.feedback = feedback;
        self
    }

    /// Sets the gradient filter iterations (used by gradient modes only).
    pub fn grad_iters(mut self, grad_iters: u32) -> Self {
        self.grad_iters = Some(grad_iters);
        self
    }

    /// Sets the unweighted decay rate.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the weighted decay rate.
    pub fn weighted_alpha(mut self, alpha: f64) -> Self {
        self.weighted_alpha = Some(alpha);
        self
    }

    /// Sets the gradient decay rate.
    pub fn gradient_alpha(mut self, alpha: f64) -> Self {
        self.gradient_alpha = Some(alpha);
        self
    }

    /// Sets the selection midpoint.
    pub fn midpoint(mut self, midpoint: f64) -> Self {
        self.midpoint = Some(midpoint);
        self
    }

    /// Sets the selection steepness.
    pub fn steepness(mut self, steepness: f64) -> Self {
        self.steepness = Some(steepness);
        self
    }

    /// Sets the gradient normalization.
    pub fn normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization_mode = mode;
        self
    }

    /// Sets the sampling strategy.
    pub fn sampling(mut self, sampling: SamplingDescriptor) -> Self {
        self.sampling = sampling;
        self
    }

    /// Enables gradient filtering.
    pub fn filter_gradient(mut self, enabled: bool) -> Self {
        self.filter_gradient = enabled;
        self
    }

    /// Enables the closed-form blend ratio.
    pub fn best_gamma(mut self, enabled: bool) -> Self {
        self.best_gamma = enabled;
        self
    }

    /// Enables debug outputs.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Validates the inputs and produces the normalized configuration.
    pub fn build(self) -> Result<ExperimentConfig, DwError> {
        if self.scene_name.trim().is_empty() {
            return Err(DwError::config("config-scene", "scene name must not be empty"));
        }
        if self.feedback < -1 {
            return Err(DwError::Config(
                ErrorInfo::new("config-feedback", "feedback tap must be >= -1")
                    .with_context("feedback", self.feedback.to_string()),
            ));
        }
        check_rate("alpha", self.alpha)?;

        let mode = self.selection_mode;
        let weighted_alpha = self.weighted_alpha.unwrap_or(self.alpha);
        let gradient_alpha = self.gradient_alpha.unwrap_or(DEFAULT_GRADIENT_ALPHA);

        let mut config = ExperimentConfig {
            scene_name: self.scene_name,
            iters: self.iters,
            feedback: self.feedback,
            grad_iters: 0,
            alpha: self.alpha,
            weighted_alpha,
            gradient_alpha: DEFAULT_GRADIENT_ALPHA,
            selection_mode: mode,
            midpoint: 0.0,
            steepness: f64::INFINITY,
            normalization_mode: NormalizationMode::None,
            sampling: self.sampling,
            filter_gradient: false,
            best_gamma: self.best_gamma,
            debug: self.debug,
        };
        check_sampling(&config.sampling)?;
        if let SamplingDescriptor::Foveated(fovea) = &mut config.sampling {
            if fovea.shape != FoveaShape::Circle {
                fovea.radius = 0.0;
            }
        }

        match mode {
            SelectionMode::Unweighted => {
                config.weighted_alpha = config.alpha;
            }
            SelectionMode::Weighted => {
                check_rate("weighted_alpha", weighted_alpha)?;
                config.grad_iters = (self.feedback + 1) as u32;
                config.midpoint = 1.0;
            }
            SelectionMode::Linear | SelectionMode::Step | SelectionMode::Logistic => {
                check_rate("weighted_alpha", weighted_alpha)?;
                check_rate("gradient_alpha", gradient_alpha)?;
                config.grad_iters = self.grad_iters.ok_or_else(|| {
                    DwError::Config(
                        ErrorInfo::new(
                            "config-grad-iters",
                            "gradient selection modes need explicit grad_iters",
                        )
                        .with_context("mode", mode.name()),
                    )
                })?;
                config.gradient_alpha = gradient_alpha;
                config.normalization_mode = self.normalization_mode;
                config.filter_gradient = self.filter_gradient;
                config.midpoint = require_finite("midpoint", self.midpoint, mode)?;
                if mode != SelectionMode::Step {
                    config.steepness = require_finite("steepness", self.steepness, mode)?;
                }
            }
        }
        Ok(config)
    }
}

fn check_rate(name: &str, value: f64) -> Result<(), DwError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(DwError::Config(
            ErrorInfo::new("config-rate", format!("{name} must lie in (0, 1]"))
                .with_context(name, format!("{value:?}")),
        ))
    }
}

fn require_finite(name: &str, value: Option<f64>, mode: SelectionMode) -> Result<f64, DwError> {
    match value {
        Some(value) if value.is_finite() => Ok(value),
        Some(value) => Err(DwError::Config(
            ErrorInfo::new("config-selection", format!("{name} must be finite"))
                .with_context("mode", mode.name())
                .with_context(name, format!("{value:?}")),
        )),
        None => Err(DwError::Config(
            ErrorInfo::new("config-selection", format!("{name} is required"))
                .with_context("mode", mode.name()),
        )),
    }
}

fn check_sampling(sampling: &SamplingDescriptor) -> Result<(), DwError> {
    match sampling {
        SamplingDescriptor::None => Ok(()),
        SamplingDescriptor::Foveated(fovea) => {
            if fovea.sample_count <= 0.0 || !fovea.sample_count.is_finite() {
                return Err(DwError::config(
                    "config-fovea",
                    "fovea sample count must be positive",
                ));
            }
            if fovea.shape == FoveaShape::Circle && !(fovea.radius > 0.0) {
                return Err(DwError::config(
                    "config-fovea",
                    "circular fovea needs a positive radius",
                ));
            }
            Ok(())
        }
        SamplingDescriptor::Adaptive(adaptive) => {
            if adaptive.min_variance > adaptive.max_variance || adaptive.min_spp > adaptive.max_spp
            {
                return Err(DwError::Config(
                    ErrorInfo::new("config-adaptive", "adaptive bounds are inverted")
                        .with_hint("expected min_variance <= max_variance and min_spp <= max_spp"),
                ));
            }
            Ok(())
        }
    }
}

/// On-disk representation used by `metadata.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Scene name.
    pub scene_name: String,
    /// Spatial filter iterations.
    pub iters: u32,
    /// Feedback tap.
    pub feedback: i32,
    /// Gradient filter iterations.
    #[serde(default)]
    pub grad_iters: Option<u32>,
    /// Unweighted decay rate.
    pub alpha: f64,
    /// Weighted decay rate.
    #[serde(default)]
    pub weighted_alpha: Option<f64>,
    /// Gradient decay rate.
    #[serde(default)]
    pub gradient_alpha: Option<f64>,
    /// Selection mode.
    pub selection_mode: SelectionMode,
    /// Selection midpoint.
    #[serde(with = "extended_f64")]
    pub midpoint: f64,
    /// Selection steepness.
    #[serde(with = "extended_f64")]
    pub steepness: f64,
    /// Gradient normalization.
    #[serde(default = "ConfigRecord::default_normalization")]
    pub normalization_mode: NormalizationMode,
    /// Sampling strategy.
    #[serde(default)]
    pub sampling: SamplingDescriptor,
    /// Gradient filtering flag.
    #[serde(default)]
    pub filter_gradient: bool,
    /// Closed-form blend ratio flag.
    #[serde(default)]
    pub best_gamma: bool,
    /// Debug flag.
    #[serde(default)]
    pub debug: bool,
}

impl ConfigRecord {
    fn default_normalization() -> NormalizationMode {
        NormalizationMode::None
    }
}

impl From<ExperimentConfig> for ConfigRecord {
    fn from(config: ExperimentConfig) -> Self {
        Self {
            scene_name: config.scene_name,
            iters: config.iters,
            feedback: config.feedback,
            grad_iters: Some(config.grad_iters),
            alpha: config.alpha,
            weighted_alpha: Some(config.weighted_alpha),
            gradient_alpha: Some(config.gradient_alpha),
            selection_mode: config.selection_mode,
            midpoint: config.midpoint,
            steepness: config.steepness,
            normalization_mode: config.normalization_mode,
            sampling: config.sampling,
            filter_gradient: config.filter_gradient,
            best_gamma: config.best_gamma,
            debug: config.debug,
        }
    }
}

impl TryFrom<ConfigRecord> for ExperimentConfig {
    type Error = DwError;

    fn try_from(record: ConfigRecord) -> Result<Self, Self::Error> {
        let mut builder = ExperimentConfigBuilder::new(record.scene_name, record.selection_mode)
            .iters(record.iters, record.feedback)
            .alpha(record.alpha)
            .midpoint(record.midpoint)
            .steepness(record.steepness)
            .normalization(record.normalization_mode)
            .sampling(record.sampling)
            .filter_gradient(record.filter_gradient)
            .best_gamma(record.best_gamma)
            .debug(record.debug);
        if let Some(grad_iters) = record.grad_iters {
            builder = builder.grad_iters(grad_iters);
        }
        if let Some(alpha) = record.weighted_alpha {
            builder = builder.weighted_alpha(alpha);
        }
        if let Some(alpha) = record.gradient_alpha {
            builder = builder.gradient_alpha(alpha);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unweighted_resets_irrelevant_fields() {
        let config = ExperimentConfig::builder("Scene", SelectionMode::Unweighted)
            .iters(2, -1)
            .midpoint(0.5)
            .steepness(10.0)
            .gradient_alpha(0.3)
            .normalization(NormalizationMode::StandardDeviation)
            .build()
            .unwrap();
        assert_eq!(config.grad_iters(), 0);
        assert_eq!(config.table_coordinates(), (f64::INFINITY, 0.0));
        assert_eq!(config.normalization_mode(), NormalizationMode::None);
        assert_eq!(config.weighted_alpha(), config.alpha());
    }

    #[test]
    fn weighted_derives_grad_iters_from_feedback() {
        let config = ExperimentConfig::builder("Scene", SelectionMode::Weighted)
            .iters(3, 1)
            .grad_iters(9)
            .build()
            .unwrap();
        assert_eq!(config.grad_iters(), 2);
        assert_eq!(config.table_coordinates(), (f64::INFINITY, 1.0));
    }

    #[test]
    fn gradient_modes_require_grad_iters() {
        let err = ExperimentConfig::builder("Scene", SelectionMode::Linear)
            .iters(2, 0)
            .midpoint(0.5)
            .steepness(1.0)
            .build()
            .unwrap_err();
        assert_eq!(err.info().code, "config-grad-iters");
    }

    #[test]
    fn step_uses_infinite_steepness() {
        let config = ExperimentConfig::builder("Scene", SelectionMode::Step)
            .iters(2, 0)
            .grad_iters(1)
            .midpoint(0.05)
            .steepness(3.0)
            .build()
            .unwrap();
        assert!(config.steepness().is_infinite());
    }

    #[test]
    fn alpha_out_of_range_is_rejected() {
        let err = ExperimentConfig::builder("Scene", SelectionMode::Unweighted)
            .alpha(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, DwError::Config(_)));
    }

    #[test]
    fn enum_names_accept_legacy_aliases() {
        assert_eq!(
            NormalizationMode::from_name("std"),
            Some(NormalizationMode::StandardDeviation)
        );
        assert_eq!(
            NormalizationMode::from_name("STANDARD_DEVIATION"),
            Some(NormalizationMode::StandardDeviation)
        );
        assert_eq!(FoveaShape::from_name("split_horizontally"), Some(FoveaShape::SplitHorizontally));
        assert_eq!(FoveaMovePattern::from_name("bogus"), None);
    }

    #[test]
    fn record_round_trip_goes_through_builder() {
        let config = ExperimentConfig::builder("Scene", SelectionMode::Logistic)
            .iters(4, 0)
            .grad_iters(1)
            .midpoint(0.5)
            .steepness(1.0)
            .normalization(NormalizationMode::Std2)
            .build()
            .unwrap();
        let record = ConfigRecord::from(config.clone());
        let back = ExperimentConfig::try_from(record).unwrap();
        assert_eq!(back, config);
    }
}
