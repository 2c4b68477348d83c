#![doc = "Closed-form and Monte-Carlo analysis of blended temporal accumulation."]

pub mod estimator;
pub mod montecarlo;
pub mod rng;

pub use estimator::{
    blended_variance, blended_weights, decay_weight, optimal_ratio, recursive_optimal_weights,
    unweighted_weights, weighted_weights, BlendMoments, RatioPolicy,
};
pub use montecarlo::{empirical_optimal_ratio, estimate_variance, MonteCarloOptions};
