//! Closed-form blend ratio between the weighted and unweighted estimators.
//!
//! Frame `i` of `t` contributes the mean of `n[i]` samples with variance
//! `sigma^2 / n[i]` and decays by `beta^(t-1-i)`. The unweighted estimator
//! normalizes the decay weights, the weighted one additionally multiplies
//! them by the sample count. A ratio `r` blends the two as
//! `lerp(weighted, unweighted, r)`.

use dw_core::errors::{DwError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative size below which the quadratic term of the blended variance is
/// treated as zero.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Behaviour of [`optimal_ratio`] outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RatioPolicy {
    /// Clamp to the convex combination of the two estimators.
    #[default]
    Clamped,
    /// Return the unconstrained minimiser.
    Unclamped,
}

/// Decay weight `beta^(t-1-i)` of frame `i` when estimating at frame `t`.
///
/// Frames at or after `t` have not been accumulated yet and weigh zero.
pub fn decay_weight(i: usize, t: usize, beta: f64) -> f64 {
    match t.checked_sub(i + 1) {
        Some(age) => beta.powi(age as i32),
        None => 0.0,
    }
}

fn check_inputs(counts: &[f64], beta: f64) -> Result<(), DwError> {
    if counts.is_empty() {
        return Err(DwError::config("blend-counts", "sample counts must not be empty"));
    }
    if let Some((frame, count)) = counts
        .iter()
        .enumerate()
        .find(|(_, count)| !(**count > 0.0 && count.is_finite()))
    {
        return Err(DwError::Config(
            ErrorInfo::new("blend-counts", "sample counts must be positive")
                .with_context("frame", frame.to_string())
                .with_context("count", format!("{count:?}")),
        ));
    }
    if !(0.0..=1.0).contains(&beta) {
        return Err(DwError::Config(
            ErrorInfo::new("blend-beta", "decay factor must lie in [0, 1]")
                .with_context("beta", format!("{beta:?}")),
        ));
    }
    Ok(())
}

fn normalized(weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Normalized decay weights ignoring sample counts.
pub fn unweighted_weights(counts: &[f64], beta: f64) -> Result<Vec<f64>, DwError> {
    check_inputs(counts, beta)?;
    let t = counts.len();
    Ok(normalized((0..t).map(|i| decay_weight(i, t, beta)).collect()))
}

/// Normalized decay weights scaled by sample count.
pub fn weighted_weights(counts: &[f64], beta: f64) -> Result<Vec<f64>, DwError> {
    check_inputs(counts, beta)?;
    let t = counts.len();
    Ok(normalized(
        counts
            .iter()
            .enumerate()
            .map(|(i, n)| n * decay_weight(i, t, beta))
            .collect(),
    ))
}

/// `lerp(weighted, unweighted, ratio)`; `ratio = 1` is the unweighted estimator.
pub fn blended_weights(counts: &[f64], beta: f64, ratio: f64) -> Result<Vec<f64>, DwError> {
    let unweighted = unweighted_weights(counts, beta)?;
    let weighted = weighted_weights(counts, beta)?;
    Ok(weighted
        .iter()
        .zip(&unweighted)
        .map(|(w, u)| w * (1.0 - ratio) + u * ratio)
        .collect())
}

/// Sums that determine the blended variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendMoments {
    /// `sum B^2`.
    pub m0: f64,
    /// `sum B^2 n`.
    pub m1: f64,
    /// `sum B^2 / n`.
    pub m2: f64,
    /// `sum B`.
    pub wu: f64,
    /// `sum n B`.
    pub ww: f64,
}

impl BlendMoments {
    /// Accumulates the moments of `counts` under decay `beta`.
    pub fn compute(counts: &[f64], beta: f64) -> Result<Self, DwError> {
        check_inputs(counts, beta)?;
        let t = counts.len();
        let mut moments = BlendMoments {
            m0: 0.0,
            m1: 0.0,
            m2: 0.0,
            wu: 0.0,
            ww: 0.0,
        };
        for (i, &n) in counts.iter().enumerate() {
            let b = decay_weight(i, t, beta);
            moments.m0 += b * b;
            moments.m1 += b * b * n;
            moments.m2 += b * b / n;
            moments.wu += b;
            moments.ww += n * b;
        }
        Ok(moments)
    }

    /// Numerator `X = Wu (Wu M1 - Ww M0)` of the optimal ratio.
    pub fn x(&self) -> f64 {
        self.wu * (self.wu * self.m1 - self.ww * self.m0)
    }

    /// `Y = Ww (Wu M0 - Ww M2)`; the optimal ratio is `X / (X - Y)`.
    pub fn y(&self) -> f64 {
        self.ww * (self.wu * self.m0 - self.ww * self.m2)
    }

    /// Variance of the blend at `ratio`, in units of `sigma^2`.
    pub fn variance(&self, ratio: f64) -> f64 {
        let s = 1.0 - ratio;
        s * s * self.m1 / (self.ww * self.ww)
            + 2.0 * ratio * s * self.m0 / (self.ww * self.wu)
            + ratio * ratio * self.m2 / (self.wu * self.wu)
    }
}

/// Ratio minimising the variance of the blended estimator.
///
/// When the two estimators coincide (`X = 0` and `X - Y = 0`, e.g. uniform
/// sample counts) every ratio is optimal and the unweighted extreme `1` is
/// returned.
pub fn optimal_ratio(counts: &[f64], beta: f64, policy: RatioPolicy) -> Result<f64, DwError> {
    let moments = BlendMoments::compute(counts, beta)?;
    let x = moments.x();
    let denominator = x - moments.y();
    let scale = moments.wu * moments.wu * moments.m1
        + 2.0 * moments.wu * moments.ww * moments.m0
        + moments.ww * moments.ww * moments.m2;
    let ratio = if denominator.abs() <= DEGENERATE_TOLERANCE * scale {
        1.0
    } else {
        x / denominator
    };
    debug!(x, y = moments.y(), ratio, frames = counts.len(), "optimal blend ratio");
    Ok(match policy {
        RatioPolicy::Clamped => ratio.clamp(0.0, 1.0),
        RatioPolicy::Unclamped => ratio,
    })
}

/// Variance of the blended estimator with per-sample deviation `sigma`.
pub fn blended_variance(counts: &[f64], beta: f64, ratio: f64, sigma: f64) -> Result<f64, DwError> {
    Ok(sigma * sigma * BlendMoments::compute(counts, beta)?.variance(ratio))
}

/// Normalized weights of the recursive per-frame optimal estimator.
///
/// Each frame's gain is the ratio of second to first decayed moments of the
/// history, floored at `1 / n[t]`.
pub fn recursive_optimal_weights(counts: &[f64], beta: f64) -> Result<Vec<f64>, DwError> {
    check_inputs(counts, beta)?;
    let mut gains: Vec<f64> = Vec::with_capacity(counts.len());
    for t in 1..=counts.len() {
        let gain = if t == 1 {
            1.0
        } else {
            let (mut num, mut den) = (0.0, 0.0);
            for (i, (&gain, &n)) in gains.iter().zip(counts).enumerate() {
                let b = decay_weight(i, t, beta);
                num += gain * b * b * n;
                den += gain * b * n;
            }
            let floor = 1.0 / counts[t - 1];
            if den > 0.0 {
                (num / den).max(floor)
            } else {
                floor
            }
        };
        gains.push(gain);
    }
    let t = counts.len();
    Ok(normalized(
        gains
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(i, (gain, n))| gain * decay_weight(i, t, beta) * n)
            .collect(),
    ))
}
