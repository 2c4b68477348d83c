//! Structural similarity on tone-mapped frames.

use dw_frames::Frame;
use serde::{Deserialize, Serialize};

use crate::backend::NumericBackend;
use crate::fovea::Mask;
use crate::tonemap::to_ldr;

/// Stabiliser of the luminance term for unit data range.
pub const C1: f64 = 0.01 * 0.01;
/// Stabiliser of the contrast-structure term for unit data range.
pub const C2: f64 = 0.03 * 0.03;

/// Local statistics window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SsimWindow {
    /// Normalized Gaussian with the given deviation, truncated at `radius`.
    Gaussian {
        /// Standard deviation in pixels.
        sigma: f64,
        /// Half width in pixels.
        radius: usize,
    },
    /// Box filter of odd `size`.
    Uniform(usize),
}

impl Default for SsimWindow {
    fn default() -> Self {
        SsimWindow::Gaussian {
            sigma: 1.5,
            radius: 5,
        }
    }
}

impl SsimWindow {
    /// 7x7 box window used by the fast variant.
    pub fn fast() -> Self {
        SsimWindow::Uniform(7)
    }

    /// Half width; also the border cropped from the SSIM map.
    pub fn radius(&self) -> usize {
        match *self {
            SsimWindow::Gaussian { radius, .. } => radius,
            SsimWindow::Uniform(size) => size / 2,
        }
    }

    fn taps(&self) -> Vec<f64> {
        match *self {
            SsimWindow::Gaussian { sigma, radius } => {
                let raw: Vec<f64> = (0..=2 * radius)
                    .map(|k| {
                        let x = k as f64 - radius as f64;
                        (-0.5 * x * x / (sigma * sigma)).exp()
                    })
                    .collect();
                let total: f64 = raw.iter().sum();
                raw.into_iter().map(|w| w / total).collect()
            }
            SsimWindow::Uniform(size) => {
                let size = 2 * (size / 2) + 1;
                vec![1.0 / size as f64; size]
            }
        }
    }
}

/// Half-sample symmetric boundary: `d c b a | a b c d | d c b a`.
fn reflect(mut index: isize, len: usize) -> usize {
    let n = len as isize;
    loop {
        if index < 0 {
            index = -index - 1;
        } else if index >= n {
            index = 2 * n - index - 1;
        } else {
            return index as usize;
        }
    }
}

struct Plane<'a> {
    width: usize,
    height: usize,
    taps: &'a [f64],
    radius: usize,
}

impl Plane<'_> {
    fn filter(&self, backend: &dyn NumericBackend, source: &[f64]) -> Vec<f64> {
        let (width, height, radius) = (self.width, self.height, self.radius as isize);
        let mut rows = vec![0.0; source.len()];
        backend.fill(&mut rows, &|index: usize| {
            let (x, y) = ((index % width) as isize, index / width);
            self.taps
                .iter()
                .enumerate()
                .map(|(k, w)| w * source[y * width + reflect(x + k as isize - radius, width)])
                .sum::<f64>()
        });
        let mut out = vec![0.0; source.len()];
        backend.fill(&mut out, &|index: usize| {
            let (x, y) = (index % width, (index / width) as isize);
            self.taps
                .iter()
                .enumerate()
                .map(|(k, w)| w * rows[reflect(y + k as isize - radius, height) * width + x])
                .sum::<f64>()
        });
        out
    }
}

/// Mean SSIM of the tone-mapped frames averaged over the three channels.
///
/// The border of `window.radius()` pixels is excluded unless the frame is too
/// small to crop. With a mask only covered pixels are averaged; an empty
/// selection yields `NaN`.
pub fn ssim(
    backend: &dyn NumericBackend,
    reference: &Frame,
    candidate: &Frame,
    window: SsimWindow,
    mask: Option<&Mask>,
) -> f64 {
    let (width, height) = (reference.width(), reference.height());
    let taps = window.taps();
    let plane = Plane {
        width,
        height,
        taps: &taps,
        radius: window.radius(),
    };
    let pad = window.radius();
    let crop = width > 2 * pad && height > 2 * pad;
    let selected: Vec<usize> = (0..width * height)
        .filter(|&index| {
            let (x, y) = (index % width, index / width);
            let inside = !crop || (x >= pad && x < width - pad && y >= pad && y < height - pad);
            inside && mask.map_or(true, |mask| mask.contains(index))
        })
        .collect();
    if selected.is_empty() {
        return f64::NAN;
    }

    let mut total = 0.0;
    for channel in 0..3 {
        let ldr = |frame: &Frame| {
            let data = frame.data();
            let mut out = vec![0.0; width * height];
            backend.fill(&mut out, &|index: usize| to_ldr(data[index * 3 + channel]));
            out
        };
        let x = ldr(reference);
        let y = ldr(candidate);
        let product = |a: &[f64], b: &[f64]| {
            let mut out = vec![0.0; a.len()];
            backend.fill(&mut out, &|index: usize| a[index] * b[index]);
            out
        };
        let ux = plane.filter(backend, &x);
        let uy = plane.filter(backend, &y);
        let uxx = plane.filter(backend, &product(&x, &x));
        let uyy = plane.filter(backend, &product(&y, &y));
        let uxy = plane.filter(backend, &product(&x, &y));

        let mut values = vec![0.0; selected.len()];
        backend.fill(&mut values, &|slot: usize| {
            let index = selected[slot];
            let (mx, my) = (ux[index], uy[index]);
            let vx = uxx[index] - mx * mx;
            let vy = uyy[index] - my * my;
            let vxy = uxy[index] - mx * my;
            ((2.0 * mx * my + C1) * (2.0 * vxy + C2))
                / ((mx * mx + my * my + C1) * (vx + vy + C2))
        });
        total += backend.sum(&values) / values.len() as f64;
    }
    total / 3.0
}
