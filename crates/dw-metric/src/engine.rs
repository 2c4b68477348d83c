//! Per-frame error maps and their reductions.

use dw_core::errors::{DwError, ErrorInfo};
use dw_core::measure::{Device, ErrorKind, Field};
use dw_frames::Frame;
use tracing::debug;

use crate::backend::{backend_for, NumericBackend};
use crate::fovea::Mask;
use crate::report::FrameReport;
use crate::ssim::{ssim, SsimWindow};

/// Regulariser added to the squared reference norm of the relative MSE.
pub const REL_MSE_EPSILON: f64 = 1e-2;

/// Per-pixel error of a candidate frame against its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMap {
    width: usize,
    height: usize,
    kind: ErrorKind,
    values: Vec<f64>,
    mask: Option<Mask>,
}

impl ErrorMap {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Error function the map was computed with.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Row-major per-pixel errors.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mask restricting the reductions, if any.
    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    fn selected(&self) -> Vec<f64> {
        match &self.mask {
            Some(mask) => self
                .values
                .iter()
                .enumerate()
                .filter(|(index, _)| mask.contains(*index))
                .map(|(_, value)| *value)
                .collect(),
            None => self.values.clone(),
        }
    }
}

/// Pixel error of one RGB triple.
fn pixel_error(kind: ErrorKind, reference: &[f32], candidate: &[f32]) -> f64 {
    let mut abs = 0.0;
    let mut squared = 0.0;
    let mut reference_squared = 0.0;
    for (r, c) in reference.iter().zip(candidate) {
        let (r, c) = (f64::from(*r), f64::from(*c));
        let diff = r - c;
        abs += diff.abs();
        squared += diff * diff;
        reference_squared += r * r;
    }
    match kind {
        ErrorKind::L1 => abs,
        ErrorKind::L2 => squared.sqrt(),
        ErrorKind::RelMse => squared / (reference_squared + REL_MSE_EPSILON),
    }
}

/// Linear-interpolated percentile of ascending `sorted` values.
fn percentile(sorted: &[f64], rank: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = rank / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

/// Computes error maps and frame reports on an injected numeric backend.
pub struct MetricEngine {
    backend: Box<dyn NumericBackend>,
    window: SsimWindow,
}

impl std::fmt::Debug for MetricEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEngine")
            .field("backend", &self.backend.name())
            .field("window", &self.window)
            .finish()
    }
}

impl MetricEngine {
    /// Engine on the backend implementing `device` with the Gaussian SSIM window.
    pub fn new(device: Device) -> Self {
        Self::with_backend(backend_for(device))
    }

    /// Engine on a caller-supplied backend.
    pub fn with_backend(backend: Box<dyn NumericBackend>) -> Self {
        debug!(backend = backend.name(), "metric engine ready");
        Self {
            backend,
            window: SsimWindow::default(),
        }
    }

    /// Replaces the SSIM window.
    pub fn with_window(mut self, window: SsimWindow) -> Self {
        self.window = window;
        self
    }

    /// Backend in use.
    pub fn backend(&self) -> &dyn NumericBackend {
        self.backend.as_ref()
    }

    /// SSIM window in use.
    pub fn window(&self) -> SsimWindow {
        self.window
    }

    /// Per-pixel error map; `mask` restricts later reductions.
    pub fn compute_frame(
        &self,
        reference: &Frame,
        candidate: &Frame,
        kind: ErrorKind,
        mask: Option<&Mask>,
    ) -> Result<ErrorMap, DwError> {
        if !reference.same_shape(candidate) {
            return Err(DwError::FrameRead(
                ErrorInfo::new("frame-shape-mismatch", "reference and candidate differ in size")
                    .with_context("reference", format!("{}x{}", reference.width(), reference.height()))
                    .with_context("candidate", format!("{}x{}", candidate.width(), candidate.height())),
            ));
        }
        if let Some(mask) = mask {
            if mask.width() != reference.width() || mask.height() != reference.height() {
                return Err(DwError::Config(
                    ErrorInfo::new("mask-shape", "mask and frame differ in size")
                        .with_context("mask", format!("{}x{}", mask.width(), mask.height())),
                ));
            }
        }
        let (r, c) = (reference.data(), candidate.data());
        let mut values = vec![0.0; reference.pixel_count()];
        self.backend.fill(&mut values, &|index: usize| {
            let range = index * 3..index * 3 + 3;
            pixel_error(kind, &r[range.clone()], &c[range])
        });
        Ok(ErrorMap {
            width: reference.width(),
            height: reference.height(),
            kind,
            values,
            mask: mask.cloned(),
        })
    }

    /// Reduces `map` to the requested error-map fields.
    ///
    /// [`Field::Ssim`] needs the frames themselves and is filled in by
    /// [`MetricEngine::evaluate_frame`].
    pub fn reduce(&self, map: &ErrorMap, fields: &[Field]) -> FrameReport {
        let mut report = FrameReport::default();
        let mut sorted = map.selected();
        let count = sorted.len();
        self.backend.sort(&mut sorted);
        let mean = if count == 0 {
            f64::NAN
        } else {
            self.backend.sum(&sorted) / count as f64
        };
        let p99 = percentile(&sorted, 99.0);
        for &field in fields {
            let value = match field {
                Field::Mean => mean,
                Field::P25 | Field::P50 | Field::P75 | Field::P99 => {
                    percentile(&sorted, field.percentile().unwrap_or(f64::NAN))
                }
                Field::Top1Percent => {
                    let tail = &sorted[sorted.partition_point(|v| *v <= p99)..];
                    if count == 0 {
                        f64::NAN
                    } else if tail.is_empty() {
                        p99
                    } else {
                        self.backend.sum(tail) / tail.len() as f64
                    }
                }
                Field::Ssim => continue,
            };
            report.insert(field, value);
        }
        report
    }

    /// Error map, reductions and SSIM of one frame pair.
    pub fn evaluate_frame(
        &self,
        reference: &Frame,
        candidate: &Frame,
        kind: ErrorKind,
        fields: &[Field],
        mask: Option<&Mask>,
    ) -> Result<FrameReport, DwError> {
        let map = self.compute_frame(reference, candidate, kind, mask)?;
        let mut report = self.reduce(&map, fields);
        if fields.contains(&Field::Ssim) {
            let score = ssim(self.backend.as_ref(), reference, candidate, self.window, mask);
            report.insert(Field::Ssim, score);
        }
        Ok(report)
    }
}
