//! Canonical experiment names.
//!
//! Every token of a directory name is described once in a declarative table: an emitter
//! producing the token from a configuration, a pattern recognising it inside a
//! name and a parser writing the captured values back into a
//! [`PartialConfig`]. `encode` walks the table in order, `decode` walks it
//! again over the name, so both directions share a single description.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    AdaptiveSampling, ExperimentConfig, FoveaMovePattern, FoveaMovement, FoveaShape,
    FoveatedSampling, NormalizationMode, SamplingDescriptor, SelectionMode,
};
use crate::errors::{DwError, ErrorInfo};

/// Fovea radius assumed when a circular fovea name carries no `Radius` token.
pub const DEFAULT_FOVEA_RADIUS: f64 = 200.0;

const FLOAT: &str = r"[-+]?(?:inf|NaN|(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)";
const END: &str = r"(?:_|$)";

/// Directory name that uniquely identifies a normalized [`ExperimentConfig`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalName(String);

impl CanonicalName {
    /// Borrows the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Wraps an existing directory name after checking that it decodes for `scene_name`.
    ///
    /// Stricter than [`decode`]: the name must carry an `iters(..)` token and
    /// every character after the scene prefix must belong to a known token.
    pub fn parse(name: &str, scene_name: &str) -> Result<(Self, PartialConfig), DwError> {
        let (config, unconsumed) = decode_parts(name, scene_name)?;
        if config.iters.is_none() {
            return Err(DwError::Parse(
                ErrorInfo::new("codec-iters", "name carries no iters token").with_context("name", name),
            ));
        }
        if !unconsumed.is_empty() {
            return Err(DwError::Parse(
                ErrorInfo::new("codec-unconsumed", "name contains text outside the known tokens")
                    .with_context("name", name)
                    .with_context("rest", unconsumed),
            ));
        }
        Ok((Self(name.to_string()), config))
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for CanonicalName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// Fields recovered from a canonical name.
///
/// Only the fields the encoder writes for the decoded selection mode are
/// populated; everything else stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialConfig {
    /// Scene prefix the name was decoded against.
    pub scene_name: String,
    /// Decoded selection mode.
    pub selection_mode: SelectionMode,
    /// Spatial filter iterations.
    pub iters: Option<u32>,
    /// Feedback tap.
    pub feedback: Option<i32>,
    /// Gradient filter iterations.
    pub grad_iters: Option<u32>,
    /// Selection midpoint.
    pub midpoint: Option<f64>,
    /// Selection steepness.
    pub steepness: Option<f64>,
    /// Unweighted decay rate.
    pub alpha: Option<f64>,
    /// Weighted decay rate.
    pub weighted_alpha: Option<f64>,
    /// Gradient decay rate.
    pub gradient_alpha: Option<f64>,
    /// Gradient normalization.
    pub normalization_mode: Option<NormalizationMode>,
    /// Sampling strategy; [`SamplingDescriptor::None`] when no token is present.
    pub sampling: SamplingDescriptor,
    /// `FG` flag.
    pub filter_gradient: bool,
    /// `BG` flag.
    pub best_gamma: bool,
    /// Trailing `d` flag.
    pub debug: bool,
}

impl PartialConfig {
    fn empty(scene_name: &str) -> Self {
        Self {
            scene_name: scene_name.to_string(),
            selection_mode: SelectionMode::Unweighted,
            iters: None,
            feedback: None,
            grad_iters: None,
            midpoint: None,
            steepness: None,
            alpha: None,
            weighted_alpha: None,
            gradient_alpha: None,
            normalization_mode: None,
            sampling: SamplingDescriptor::None,
            filter_gradient: false,
            best_gamma: false,
            debug: false,
        }
    }

    /// Pivot-table coordinates using the bucket policy of the normalized builder.
    pub fn table_coordinates(&self) -> (f64, f64) {
        match self.selection_mode {
            SelectionMode::Unweighted => (f64::INFINITY, 0.0),
            SelectionMode::Weighted => (f64::INFINITY, 1.0),
            SelectionMode::Step => (f64::INFINITY, self.midpoint.unwrap_or(f64::NAN)),
            SelectionMode::Linear | SelectionMode::Logistic => (
                self.steepness.unwrap_or(f64::NAN),
                self.midpoint.unwrap_or(f64::NAN),
            ),
        }
    }
}

impl From<&ExperimentConfig> for PartialConfig {
    fn from(config: &ExperimentConfig) -> Self {
        let mode = config.selection_mode();
        let gradient = mode.is_gradient_based();
        let mut partial = PartialConfig::empty(config.scene_name());
        partial.selection_mode = mode;
        partial.iters = Some(config.iters());
        partial.feedback = Some(config.feedback());
        partial.grad_iters = gradient.then_some(config.grad_iters());
        partial.midpoint = gradient.then_some(config.midpoint());
        partial.steepness = matches!(mode, SelectionMode::Linear | SelectionMode::Logistic)
            .then_some(config.steepness());
        partial.alpha = Some(config.alpha());
        partial.weighted_alpha = (mode != SelectionMode::Unweighted).then_some(config.weighted_alpha());
        partial.gradient_alpha = gradient.then_some(config.gradient_alpha());
        partial.normalization_mode = gradient.then_some(config.normalization_mode());
        partial.sampling = *config.sampling();
        partial.filter_gradient = gradient && config.filter_gradient();
        partial.best_gamma = config.best_gamma();
        partial.debug = config.debug();
        partial
    }
}

/// Decoder scratch state shared by the token parsers.
struct DecodeState {
    partial: PartialConfig,
    mode: Option<SelectionMode>,
    fovea: Option<(FoveaShape, FoveaMovePattern, f64)>,
    radius: Option<f64>,
    movement: Option<FoveaMovement>,
}

type EmitFn = fn(&ExperimentConfig) -> Option<String>;
type ParseFn = fn(&Captures<'_>, &mut DecodeState) -> Result<(), DwError>;

/// One entry of the name grammar.
struct TokenSpec {
    /// Token family, used in diagnostics.
    name: &'static str,
    emit: EmitFn,
    /// Pattern matched against `_`-prefixed name remainders; `{F}` expands to
    /// a float literal and `{E}` to a token terminator.
    pattern: &'static str,
    parse: ParseFn,
}

/// Ordered name grammar.
static TOKENS: &[TokenSpec] = &[
    TokenSpec {
        name: "iters",
        emit: emit_iters,
        pattern: r"_iters\((\d+)(?:,(-?\d+))?(?:,(\d+))?\)",
        parse: parse_iters,
    },
    TokenSpec {
        name: "unweighted",
        emit: |_| None,
        pattern: r"_Unweighted{E}",
        parse: |_, state| set_mode(state, SelectionMode::Unweighted),
    },
    TokenSpec {
        name: "weighted",
        emit: |c| (c.selection_mode() == SelectionMode::Weighted).then(|| "Weighted".to_string()),
        pattern: r"_Weighted{E}",
        parse: |_, state| set_mode(state, SelectionMode::Weighted),
    },
    TokenSpec {
        name: "linear",
        emit: |c| emit_ramp(c, SelectionMode::Linear),
        pattern: r"_Linear\(({F}),({F})\)",
        parse: |caps, state| parse_ramp(caps, state, SelectionMode::Linear),
    },
    TokenSpec {
        name: "step",
        emit: |c| {
            (c.selection_mode() == SelectionMode::Step)
                .then(|| format!("Step({})", float(c.midpoint())))
        },
        pattern: r"_Step\(({F})\)",
        parse: |caps, state| {
            set_mode(state, SelectionMode::Step)?;
            state.partial.midpoint = Some(float_at(caps, 1)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "logistic",
        emit: |c| emit_ramp(c, SelectionMode::Logistic),
        pattern: r"_Logistic\(({F}),({F})\)",
        parse: |caps, state| parse_ramp(caps, state, SelectionMode::Logistic),
    },
    TokenSpec {
        name: "alpha",
        emit: |c| Some(format!("Alpha({})", float(c.alpha()))),
        pattern: r"_Alpha\(({F})\)",
        parse: |caps, state| {
            state.partial.alpha = Some(float_at(caps, 1)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "weighted_alpha",
        emit: |c| {
            (c.selection_mode() != SelectionMode::Unweighted)
                .then(|| format!("WAlpha({})", float(c.weighted_alpha())))
        },
        pattern: r"_WAlpha\(({F})\)",
        parse: |caps, state| {
            state.partial.weighted_alpha = Some(float_at(caps, 1)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "gradient_alpha",
        emit: |c| {
            c.selection_mode()
                .is_gradient_based()
                .then(|| format!("GAlpha({})", float(c.gradient_alpha())))
        },
        pattern: r"_GAlpha\(({F})\)",
        parse: |caps, state| {
            state.partial.gradient_alpha = Some(float_at(caps, 1)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "normalization",
        emit: |c| {
            c.selection_mode()
                .is_gradient_based()
                .then(|| format!("Norm({})", c.normalization_mode().name()))
        },
        pattern: r"_Norm\(([A-Za-z0-9_]+)\)",
        parse: |caps, state| {
            state.partial.normalization_mode =
                Some(enum_at(caps, 1, "normalization", NormalizationMode::from_name)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "foveated",
        emit: |c| emit_foveated(c.sampling()),
        pattern: r"_Foveated\(([A-Za-z_]+),([A-Za-z_]+),({F})\)",
        parse: |caps, state| {
            let shape = enum_at(caps, 1, "fovea shape", FoveaShape::from_name)?;
            let pattern = enum_at(caps, 2, "fovea pattern", FoveaMovePattern::from_name)?;
            state.fovea = Some((shape, pattern, float_at(caps, 3)?));
            Ok(())
        },
    },
    TokenSpec {
        name: "radius",
        emit: |c| emit_radius(c.sampling()),
        pattern: r"_Radius\(({F})\)",
        parse: |caps, state| {
            state.radius = Some(float_at(caps, 1)?);
            Ok(())
        },
    },
    TokenSpec {
        name: "lissajous",
        emit: |c| emit_lissajous(c.sampling()),
        pattern: r"_Lissajous\(\[({F}), ?({F})\],\[({F}), ?({F})\](?:,\[({F}), ?({F})\])?\)",
        parse: |caps, state| {
            let phase = match caps.get(5) {
                Some(_) => [float_at(caps, 5)?, float_at(caps, 6)?],
                None => [0.0, 0.0],
            };
            state.movement = Some(FoveaMovement::Lissajous {
                freq: [float_at(caps, 1)?, float_at(caps, 2)?],
                radius: [float_at(caps, 3)?, float_at(caps, 4)?],
                phase,
            });
            Ok(())
        },
    },
    TokenSpec {
        name: "move_and_stay",
        emit: |c| emit_move_and_stay(c.sampling()),
        pattern: r"_MoveAndStay\(({F}),({F})\)",
        parse: |caps, state| {
            state.movement = Some(FoveaMovement::MoveAndStay {
                speed: float_at(caps, 1)?,
                stay_duration: float_at(caps, 2)?,
            });
            Ok(())
        },
    },
    TokenSpec {
        name: "adaptive",
        emit: |c| emit_adaptive(c.sampling()),
        pattern: r"_Adaptive\(({F}),({F}),({F}),({F}),({F})\)",
        parse: |caps, state| {
            state.partial.sampling = SamplingDescriptor::Adaptive(AdaptiveSampling {
                budget: float_at(caps, 1)?,
                min_variance: float_at(caps, 2)?,
                max_variance: float_at(caps, 3)?,
                min_spp: float_at(caps, 4)?,
                max_spp: float_at(caps, 5)?,
            });
            Ok(())
        },
    },
    TokenSpec {
        name: "filter_gradient",
        emit: |c| {
            (c.selection_mode().is_gradient_based() && c.filter_gradient()).then(|| "FG".to_string())
        },
        pattern: r"_FG{E}",
        parse: |_, state| {
            state.partial.filter_gradient = true;
            Ok(())
        },
    },
    TokenSpec {
        name: "best_gamma",
        emit: |c| c.best_gamma().then(|| "BG".to_string()),
        pattern: r"_BG{E}",
        parse: |_, state| {
            state.partial.best_gamma = true;
            Ok(())
        },
    },
    TokenSpec {
        name: "debug",
        emit: |c| c.debug().then(|| "d".to_string()),
        pattern: r"_d$",
        parse: |_, state| {
            state.partial.debug = true;
            Ok(())
        },
    },
];

/// Mode keywords whose presence makes a successful mode match mandatory.
const MODE_KEYWORDS: &[(&str, &str)] = &[
    ("linear", "_Linear("),
    ("step", "_Step("),
    ("logistic", "_Logistic("),
];

struct CompiledToken {
    spec: &'static TokenSpec,
    regex: Regex,
}

fn compiled_tokens() -> Result<&'static [CompiledToken], DwError> {
    static TABLE: OnceLock<Result<Vec<CompiledToken>, DwError>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            TOKENS
                .iter()
                .map(|spec| {
                    let source = spec.pattern.replace("{F}", FLOAT).replace("{E}", END);
                    Regex::new(&source)
                        .map(|regex| CompiledToken { spec, regex })
                        .map_err(|err| {
                            DwError::Parse(
                                ErrorInfo::new("codec-pattern", err.to_string())
                                    .with_context("token", spec.name),
                            )
                        })
                })
                .collect()
        })
        .as_deref()
        .map_err(Clone::clone)
}

/// Produces the canonical directory name of `config`.
pub fn encode(config: &ExperimentConfig) -> CanonicalName {
    let mut parts = vec![config.scene_name().to_string()];
    parts.extend(TOKENS.iter().filter_map(|token| (token.emit)(config)));
    CanonicalName(parts.join("_"))
}

/// Token text of `sampling` as it appears inside a canonical name, or `None`.
pub fn encode_sampling(sampling: &SamplingDescriptor) -> String {
    let parts: Vec<String> = [
        emit_foveated(sampling),
        emit_radius(sampling),
        emit_lissajous(sampling),
        emit_move_and_stay(sampling),
        emit_adaptive(sampling),
    ]
    .into_iter()
    .flatten()
    .collect();
    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join("_")
    }
}

/// Recovers the encoded fields from `name`, which must start with `scene_name`.
///
/// Text that matches no token is ignored; [`CanonicalName::parse`] rejects it.
pub fn decode(name: &str, scene_name: &str) -> Result<PartialConfig, DwError> {
    decode_parts(name, scene_name).map(|(partial, _)| partial)
}

/// Decodes `name` and returns the `_`-joined pieces no token claimed.
fn decode_parts(name: &str, scene_name: &str) -> Result<(PartialConfig, String), DwError> {
    let remainder = name
        .strip_prefix(scene_name)
        .filter(|rest| rest.starts_with('_'))
        .ok_or_else(|| {
            DwError::Parse(
                ErrorInfo::new("codec-scene", "name does not start with the scene prefix")
                    .with_context("name", name)
                    .with_context("scene", scene_name),
            )
        })?;

    let mut state = DecodeState {
        partial: PartialConfig::empty(scene_name),
        mode: None,
        fovea: None,
        radius: None,
        movement: None,
    };
    let mut claimed = vec![false; remainder.len()];
    for token in compiled_tokens()? {
        if let Some(caps) = token.regex.captures(remainder) {
            if let Some(whole) = caps.get(0) {
                claimed[whole.range()].iter_mut().for_each(|byte| *byte = true);
            }
            (token.spec.parse)(&caps, &mut state).map_err(|err| with_name(err, name))?;
        }
    }
    let leftover: String = remainder
        .char_indices()
        .map(|(index, ch)| if claimed[index] { '_' } else { ch })
        .collect();
    let unconsumed = leftover
        .split('_')
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    for (family, keyword) in MODE_KEYWORDS {
        if remainder.contains(keyword) && state.mode.is_none() {
            return Err(DwError::Parse(
                ErrorInfo::new("codec-mode", "selection mode token is malformed")
                    .with_context("name", name)
                    .with_context("mode", *family),
            ));
        }
    }

    let mode = match state.mode {
        Some(mode) => mode,
        None if state.partial.grad_iters.is_some() => {
            return Err(DwError::Parse(
                ErrorInfo::new(
                    "codec-mode",
                    "iters token names gradient iterations but no gradient mode token matched",
                )
                .with_context("name", name),
            ))
        }
        None => SelectionMode::Unweighted,
    };
    if state.partial.grad_iters.is_some() && !mode.is_gradient_based() {
        return Err(DwError::Parse(
            ErrorInfo::new("codec-mode", "gradient iterations given for a non-gradient mode")
                .with_context("name", name)
                .with_context("mode", mode.name()),
        ));
    }
    state.partial.selection_mode = mode;

    if let Some((shape, pattern, sample_count)) = state.fovea {
        let movement = match (pattern, state.movement) {
            (FoveaMovePattern::Lissajous, Some(m @ FoveaMovement::Lissajous { .. })) => m,
            (FoveaMovePattern::Lissajous, _) => FoveaMovement::default_lissajous(),
            (FoveaMovePattern::MoveAndStay, Some(m @ FoveaMovement::MoveAndStay { .. })) => m,
            (FoveaMovePattern::MoveAndStay, _) => {
                return Err(DwError::Parse(
                    ErrorInfo::new("codec-fovea", "move-and-stay fovea without its parameters")
                        .with_context("name", name),
                ))
            }
        };
        let radius = match shape {
            FoveaShape::Circle => state.radius.unwrap_or(DEFAULT_FOVEA_RADIUS),
            _ => 0.0,
        };
        state.partial.sampling = SamplingDescriptor::Foveated(FoveatedSampling {
            shape,
            radius,
            sample_count,
            movement,
        });
    }

    debug!(name, mode = mode.name(), "decoded experiment name");
    Ok((state.partial, unconsumed))
}

/// Name of the filtered reference run used as ground truth.
pub fn reference_name(scene_name: &str, iters: u32, feedback: i32, alpha: f64, sample_count: u32) -> String {
    format!(
        "{scene_name}_iters({iters},{feedback})_Alpha({})_{sample_count}",
        float(alpha)
    )
}

/// Name of the unfiltered reference run.
pub fn unfiltered_reference_name(scene_name: &str, sample_count: u32) -> String {
    format!("{scene_name}_{sample_count}")
}

fn float(value: f64) -> String {
    format!("{value:?}")
}

fn emit_foveated(sampling: &SamplingDescriptor) -> Option<String> {
    match sampling {
        SamplingDescriptor::Foveated(fovea) => Some(format!(
            "Foveated({},{},{})",
            fovea.shape.name(),
            fovea.movement.pattern().name(),
            float(fovea.sample_count)
        )),
        _ => None,
    }
}

fn emit_radius(sampling: &SamplingDescriptor) -> Option<String> {
    match sampling {
        SamplingDescriptor::Foveated(fovea) if fovea.shape == FoveaShape::Circle => {
            Some(format!("Radius({})", float(fovea.radius)))
        }
        _ => None,
    }
}

fn emit_lissajous(sampling: &SamplingDescriptor) -> Option<String> {
    match sampling {
        SamplingDescriptor::Foveated(FoveatedSampling {
            movement: FoveaMovement::Lissajous { freq, radius, phase },
            ..
        }) => Some(format!(
            "Lissajous({},{},{})",
            float2(*freq),
            float2(*radius),
            float2(*phase)
        )),
        _ => None,
    }
}

fn emit_move_and_stay(sampling: &SamplingDescriptor) -> Option<String> {
    match sampling {
        SamplingDescriptor::Foveated(FoveatedSampling {
            movement: FoveaMovement::MoveAndStay { speed, stay_duration },
            ..
        }) => Some(format!("MoveAndStay({},{})", float(*speed), float(*stay_duration))),
        _ => None,
    }
}

fn emit_adaptive(sampling: &SamplingDescriptor) -> Option<String> {
    match sampling {
        SamplingDescriptor::Adaptive(a) => Some(format!(
            "Adaptive({},{},{},{},{})",
            float(a.budget),
            float(a.min_variance),
            float(a.max_variance),
            float(a.min_spp),
            float(a.max_spp)
        )),
        _ => None,
    }
}

fn float2(values: [f64; 2]) -> String {
    format!("[{:?}, {:?}]", values[0], values[1])
}

fn emit_iters(config: &ExperimentConfig) -> Option<String> {
    Some(if config.selection_mode().is_gradient_based() {
        format!(
            "iters({},{},{})",
            config.iters(),
            config.feedback(),
            config.grad_iters()
        )
    } else {
        format!("iters({},{})", config.iters(), config.feedback())
    })
}

fn emit_ramp(config: &ExperimentConfig, mode: SelectionMode) -> Option<String> {
    let keyword = mode.token()?;
    (config.selection_mode() == mode).then(|| {
        format!(
            "{keyword}({},{})",
            float(config.midpoint()),
            float(config.steepness())
        )
    })
}

fn parse_iters(caps: &Captures<'_>, state: &mut DecodeState) -> Result<(), DwError> {
    state.partial.iters = Some(int_at(caps, 1)?);
    if caps.get(2).is_some() {
        state.partial.feedback = Some(int_at(caps, 2)?);
    }
    if caps.get(3).is_some() {
        state.partial.grad_iters = Some(int_at(caps, 3)?);
    }
    Ok(())
}

fn parse_ramp(caps: &Captures<'_>, state: &mut DecodeState, mode: SelectionMode) -> Result<(), DwError> {
    set_mode(state, mode)?;
    state.partial.midpoint = Some(float_at(caps, 1)?);
    state.partial.steepness = Some(float_at(caps, 2)?);
    Ok(())
}

fn set_mode(state: &mut DecodeState, mode: SelectionMode) -> Result<(), DwError> {
    match state.mode {
        Some(existing) if existing != mode => Err(DwError::Parse(
            ErrorInfo::new("codec-mode", "name carries more than one selection mode")
                .with_context("first", existing.name())
                .with_context("second", mode.name()),
        )),
        _ => {
            state.mode = Some(mode);
            Ok(())
        }
    }
}

fn capture<'a>(caps: &'a Captures<'_>, index: usize) -> Result<&'a str, DwError> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or_else(|| DwError::Parse(ErrorInfo::new("codec-capture", format!("missing group {index}"))))
}

fn float_at(caps: &Captures<'_>, index: usize) -> Result<f64, DwError> {
    let text = capture(caps, index)?;
    text.parse::<f64>().map_err(|err| {
        DwError::Parse(
            ErrorInfo::new("codec-float", err.to_string()).with_context("literal", text),
        )
    })
}

fn int_at<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Result<T, DwError>
where
    T::Err: fmt::Display,
{
    let text = capture(caps, index)?;
    text.parse::<T>().map_err(|err| {
        DwError::Parse(
            ErrorInfo::new("codec-integer", err.to_string()).with_context("literal", text),
        )
    })
}

fn enum_at<T>(
    caps: &Captures<'_>,
    index: usize,
    family: &str,
    from_name: fn(&str) -> Option<T>,
) -> Result<T, DwError> {
    let text = capture(caps, index)?;
    from_name(text).ok_or_else(|| {
        DwError::Parse(
            ErrorInfo::new("codec-enum", format!("unknown {family} name"))
                .with_context("literal", text),
        )
    })
}

fn with_name(err: DwError, name: &str) -> DwError {
    match err {
        DwError::Parse(info) => DwError::Parse(info.with_context("name", name)),
        other => other,
    }
}
