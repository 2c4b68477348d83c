//! Monte-Carlo validation of the closed-form blend ratio.
//!
//! Trials are generated in fixed-size batches, each batch drawing from its own
//! SipHash-derived substream, so results depend only on the master seed and
//! the trial count.

use dw_core::errors::{DwError, ErrorInfo};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::estimator::{unweighted_weights, weighted_weights};
use crate::rng::substream_rng;

const BATCH: usize = 4096;

/// Sampling parameters shared by the Monte-Carlo estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloOptions {
    /// Per-sample standard deviation.
    pub sigma: f64,
    /// Number of simulated histories.
    pub trials: usize,
    /// Master seed.
    pub seed: u64,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            trials: 100_000,
            seed: 0,
        }
    }
}

impl MonteCarloOptions {
    fn check(&self) -> Result<(), DwError> {
        if self.trials < 2 {
            return Err(DwError::Config(
                ErrorInfo::new("montecarlo-trials", "at least two trials are required")
                    .with_context("trials", self.trials.to_string()),
            ));
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(DwError::config("montecarlo-sigma", "sigma must be positive"));
        }
        Ok(())
    }
}

/// Calls `visit` with the per-frame sample means of every simulated history.
fn for_each_history(counts: &[f64], options: &MonteCarloOptions, mut visit: impl FnMut(&[f64])) {
    let deviations: Vec<f64> = counts.iter().map(|n| options.sigma / n.sqrt()).collect();
    let mut means = vec![0.0; counts.len()];
    let mut remaining = options.trials;
    let mut batch = 0u64;
    while remaining > 0 {
        let size = remaining.min(BATCH);
        let mut rng = substream_rng(options.seed, batch);
        for _ in 0..size {
            for (mean, deviation) in means.iter_mut().zip(&deviations) {
                let z: f64 = rng.sample(StandardNormal);
                *mean = z * deviation;
            }
            visit(&means);
        }
        remaining -= size;
        batch += 1;
    }
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Empirical variance of the estimator with normalized `weights`.
pub fn estimate_variance(
    weights: &[f64],
    counts: &[f64],
    options: &MonteCarloOptions,
) -> Result<f64, DwError> {
    options.check()?;
    if weights.len() != counts.len() {
        return Err(DwError::Config(
            ErrorInfo::new("montecarlo-shape", "weights and counts differ in length")
                .with_context("weights", weights.len().to_string())
                .with_context("counts", counts.len().to_string()),
        ));
    }
    let total: f64 = weights.iter().sum();
    let (mut sum, mut sum_sq) = (0.0, 0.0);
    for_each_history(counts, options, |means| {
        let estimate = dot(weights, means) / total;
        sum += estimate;
        sum_sq += estimate * estimate;
    });
    let trials = options.trials as f64;
    let mean = sum / trials;
    Ok(sum_sq / trials - mean * mean)
}

/// Ratio minimising the empirical variance of the blend.
///
/// Both estimators see the same simulated histories, so the minimiser of
/// `Var(w + r (u - w))` is the regression slope `-Cov(w, u - w) / Var(u - w)`.
pub fn empirical_optimal_ratio(
    counts: &[f64],
    beta: f64,
    options: &MonteCarloOptions,
) -> Result<f64, DwError> {
    options.check()?;
    let unweighted = unweighted_weights(counts, beta)?;
    let weighted = weighted_weights(counts, beta)?;
    let (mut sa, mut sd, mut sad, mut sdd) = (0.0, 0.0, 0.0, 0.0);
    for_each_history(counts, options, |means| {
        let a = dot(&weighted, means);
        let d = dot(&unweighted, means) - a;
        sa += a;
        sd += d;
        sad += a * d;
        sdd += d * d;
    });
    let trials = options.trials as f64;
    let covariance = sad / trials - (sa / trials) * (sd / trials);
    let variance = sdd / trials - (sd / trials) * (sd / trials);
    let ratio = if variance > 0.0 {
        -covariance / variance
    } else {
        1.0
    };
    debug!(ratio, trials = options.trials, "empirical blend ratio");
    Ok(ratio)
}
