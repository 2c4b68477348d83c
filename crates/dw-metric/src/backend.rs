//! Pluggable numeric backends.
//!
//! Every backend evaluates per-element work through index closures and sums
//! in fixed-size chunks whose partial sums are added in order, so the
//! sequential and the parallel backend produce bitwise identical results.

use std::sync::Arc;

use dw_core::errors::{DwError, ErrorInfo};
use dw_core::measure::Device;
use rayon::prelude::*;

/// Number of elements folded into one partial sum.
pub const SUM_CHUNK: usize = 4096;

/// Element-wise primitives the metric engine is written against.
pub trait NumericBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Sets `out[i] = f(i)` for every index.
    fn fill(&self, out: &mut [f64], f: &(dyn Fn(usize) -> f64 + Sync));

    /// Chunked sum of `values`.
    fn sum(&self, values: &[f64]) -> f64;

    /// Sorts ascending by IEEE total order.
    fn sort(&self, values: &mut [f64]);
}

fn chunk_sum(chunk: &[f64]) -> f64 {
    chunk.iter().sum()
}

/// Sequential backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl NumericBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn fill(&self, out: &mut [f64], f: &(dyn Fn(usize) -> f64 + Sync)) {
        for (index, slot) in out.iter_mut().enumerate() {
            *slot = f(index);
        }
    }

    fn sum(&self, values: &[f64]) -> f64 {
        values.chunks(SUM_CHUNK).map(chunk_sum).sum()
    }

    fn sort(&self, values: &mut [f64]) {
        values.sort_unstable_by(f64::total_cmp);
    }
}

/// Rayon data-parallel backend, optionally bound to a dedicated pool.
#[derive(Debug, Clone, Default)]
pub struct ParallelBackend {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelBackend {
    /// Backend running on a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, DwError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .map_err(|err| {
                DwError::Config(
                    ErrorInfo::new("thread-pool", err.to_string())
                        .with_context("threads", threads.to_string()),
                )
            })?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl NumericBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn fill(&self, out: &mut [f64], f: &(dyn Fn(usize) -> f64 + Sync)) {
        self.install(|| {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(index, slot)| *slot = f(index));
        });
    }

    fn sum(&self, values: &[f64]) -> f64 {
        let partials: Vec<f64> =
            self.install(|| values.par_chunks(SUM_CHUNK).map(chunk_sum).collect());
        partials.iter().sum()
    }

    fn sort(&self, values: &mut [f64]) {
        self.install(|| values.par_sort_unstable_by(f64::total_cmp));
    }
}

/// Backend implementing `device`.
pub fn backend_for(device: Device) -> Box<dyn NumericBackend> {
    match device {
        Device::Cpu => Box::new(CpuBackend),
        Device::Parallel => Box::new(ParallelBackend::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_sums_agree_bitwise() {
        let values: Vec<f64> = (0..10_000).map(|i| (i as f64).sin() * 1e-3 + 1.0 / (i as f64 + 1.0)).collect();
        let parallel = ParallelBackend::with_threads(4).unwrap();
        assert_eq!(CpuBackend.sum(&values).to_bits(), parallel.sum(&values).to_bits());
    }

    #[test]
    fn fill_and_sort_agree() {
        let mut a = vec![0.0; 9_000];
        let mut b = vec![0.0; 9_000];
        let f = |i: usize| ((i * 7919) % 1013) as f64 - 500.0;
        CpuBackend.fill(&mut a, &f);
        ParallelBackend::default().fill(&mut b, &f);
        assert_eq!(a, b);
        CpuBackend.sort(&mut a);
        ParallelBackend::default().sort(&mut b);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] <= w[1]));
    }
}
