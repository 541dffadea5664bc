// Ordinary least squares cost model for gas benchmarks
//
// Fits TotalGas (or PushRowTotal) against the statically declared feature
// list in `crate::features` and reports in-sample fit quality.
//
// Method:
// - Center the design matrix and target, then solve the centered system with
//   nalgebra's SVD (minimum-norm least squares). The intercept is recovered
//   from the column means.
// - Columns that never vary (e.g. the indicator of an operation missing from
//   the benchmark run) are excluded from the solve and pinned to 0, so a
//   rank-deficient design still yields deterministic coefficients.
// - R² and MAPE are computed on the training rows; they describe the fit,
//   not generalization.

mod config;
mod model;
mod ols;
mod statistics;
mod verdict;

pub use config::FitThresholds;
pub use model::LinearModel;
pub use ols::{fit, solve_least_squares, FitError, LeastSquares};
pub use statistics::{mean_absolute_percentage_error, r2_score, residuals};
pub use verdict::{FitReport, QualityAssessment};
