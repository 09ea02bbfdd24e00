//! # u-probability
//!
//! Continuous probability for real measurements.
//!
//! The crate answers the questions that come up when a sample of
//! continuous values (reported heights, say) meets a smooth model: what
//! share of the sample falls at or below `a`, what the normal curve says
//! about the same interval, where the two disagree and why, and how to
//! estimate by simulation what has no closed form.
//!
//! ## Modules
//!
//! - [`ecdf`]: Empirical cumulative distribution function
//! - [`special`]: Normal density, CDF and quantile, erf, gamma and beta functions
//! - [`distributions`]: Normal, Uniform, Exponential and Student's t behind one trait
//! - [`stats`]: Descriptive statistics with numerical stability guarantees
//! - [`approximation`]: Empirical vs theoretical interval probabilities, discretization
//! - [`histogram`]: Binned counts and distinct-value frequency tables
//! - [`random`]: Seeded RNG and sample drawing
//! - [`monte_carlo`]: Repeated-trial estimation with confidence intervals
//! - [`dataset`]: Height records from CSV
//! - [`config`]: TOML experiment configuration
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford's algorithm for variance,
//!   compensated summation, tail-safe normal CDF
//! - **Reproducible randomness**: every simulation takes an explicit seed
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod approximation;
pub mod config;
pub mod dataset;
pub mod distributions;
pub mod ecdf;
pub mod error;
pub mod histogram;
#[cfg(feature = "cli")]
pub mod logger;
pub mod monte_carlo;
pub mod random;
pub mod special;
pub mod stats;

pub use config::ExperimentConfig;
pub use dataset::Heights;
pub use distributions::{ContinuousDistribution, Normal};
pub use ecdf::Ecdf;
pub use error::{ProbError, Result};
pub use histogram::{FrequencyTable, Histogram};
pub use monte_carlo::{MonteCarlo, ProbabilityEstimate};
