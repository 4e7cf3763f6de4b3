//! # u-stats
//!
//! Descriptive and inferential statistics.
//!
//! The crate covers classic summary statistics together with a small set
//! of numerically careful models: a Normal distribution with closed-form
//! CDF and quantile approximations, a Student's t-distribution built on the
//! log-gamma and incomplete beta functions, a single-pass accumulator for
//! the first four moments, and kernel density estimation with exact
//! sampling from the estimate.
//!
//! ## Modules
//!
//! - [`distributions`] — [`NormalDist`] and [`StudentT`]
//! - [`stats`] — Batch descriptive statistics and the [`StreamingStat`]
//!   accumulator
//! - [`kde`] — Kernel density estimation over nine kernels
//! - [`frequency`] — Frequency tables
//! - [`special`] — Error function, log-gamma, incomplete beta
//! - [`random`] — Seeded generators and Box–Muller deviates
//! - [`math`] — Precision rounding of results
//! - [`error`] — The [`StatsError`] type
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Welford/Terriberry updates for
//!   moments, log-space evaluation for the t density, modified Lentz for
//!   continued fractions
//! - **Typed failures**: invalid input is reported as a [`StatsError`],
//!   never as a silent NaN
//! - **Property-based testing**: Mathematical invariants verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_stats::{NormalDist, StreamingStat};
//!
//! let nd = NormalDist::from_samples(&[2.5, 3.1, 2.1, 2.4, 2.7, 3.5]).unwrap();
//! let mut acc = StreamingStat::new();
//! for x in nd.samples(1_000, Some(1)).unwrap() {
//!     acc.add(x);
//! }
//! assert!((acc.mean().unwrap() - nd.mean()).abs() < 0.1);
//! ```

pub mod distributions;
pub mod error;
pub mod frequency;
pub mod kde;
pub mod math;
pub mod random;
pub mod special;
pub mod stats;

pub use distributions::{NormalDist, StudentT};
pub use error::{Result, StatsError};
pub use frequency::{FrequencyEntry, FrequencyTable};
pub use kde::{kde, kde_random, KdeSampler, Kernel, KernelDensity};
pub use math::Round;
pub use stats::StreamingStat;
