//! Per-experiment summary fed to the aggregator.

use std::collections::BTreeMap;

use dw_core::codec::{CanonicalName, PartialConfig};
use dw_core::measure::Field;
use serde::{Deserialize, Serialize};

use crate::cache::CacheOutcome;

/// Frame-averaged error of one evaluated experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Canonical name of the candidate run.
    pub name: CanonicalName,
    /// Configuration decoded from the name.
    pub config: PartialConfig,
    /// Mean over frames per field.
    pub means: BTreeMap<Field, f64>,
}

/// Mean of the non-NaN values; `NaN` when none remain.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|value| !value.is_nan())
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

impl ErrorRecord {
    /// Averages every series of `outcome`.
    pub fn from_outcome(name: CanonicalName, config: PartialConfig, outcome: &CacheOutcome) -> Self {
        let means = outcome
            .values
            .iter()
            .map(|(field, series)| (*field, nan_mean(series)))
            .collect();
        Self { name, config, means }
    }

    /// Mean of `field`, `NaN` when it was not evaluated.
    pub fn mean(&self, field: Field) -> f64 {
        self.means.get(&field).copied().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_frames_are_skipped() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(&[f64::NAN]).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }
}
