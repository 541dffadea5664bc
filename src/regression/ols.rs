// Least squares solver and model fitting
//
// Centered OLS solved with nalgebra's SVD. Equivalent to an unregularized
// linear regression with intercept; for a full-rank design the solution is
// the unique OLS estimate, otherwise it is the minimum-norm solution.

use crate::dataset::GasTable;
use crate::features::{FeatureSet, MissingFeatureColumn, Target};
use crate::regression::config::FitThresholds;
use crate::regression::model::LinearModel;
use crate::regression::statistics::{mean_absolute_percentage_error, r2_score};
use crate::regression::verdict::{FitReport, QualityAssessment};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Minimum number of observations for a fit
const MIN_SAMPLES: usize = 2;

/// Iteration cap for the SVD; well-conditioned designs converge in a few dozen
const MAX_SVD_ITERATIONS: usize = 10_000;

/// Errors for model fitting
#[derive(Error, Debug)]
pub enum FitError {
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error(transparent)]
    MissingColumn(#[from] MissingFeatureColumn),

    #[error("Expected {expected} coefficients, got {actual}")]
    CoefficientCount { expected: usize, actual: usize },

    #[error("Least squares solve failed: {0}")]
    Solver(String),
}

/// Raw least squares solution
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub intercept: f64,
    /// One coefficient per design column; constant columns are exactly 0
    pub coefficients: Vec<f64>,
    /// Numerical rank of the centered, non-constant columns
    pub rank: usize,
    /// Indices of design columns that never vary
    pub constant_columns: Vec<usize>,
}

/// Solve min ‖y - b - Xβ‖² for intercept b and coefficients β
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares, FitError> {
    let (n, p) = x.shape();
    if n < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_SAMPLES,
            actual: n,
        });
    }
    if y.len() != n {
        return Err(FitError::Solver(format!(
            "design has {} rows but target has {}",
            n,
            y.len()
        )));
    }

    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::Solver("design or target contains non-finite values".to_string()));
    }

    let x_means: Vec<f64> = (0..p).map(|j| x.column(j).mean()).collect();
    let y_mean = y.mean();

    let (active, constant_columns): (Vec<usize>, Vec<usize>) =
        (0..p).partition(|&j| x.column(j).iter().any(|&v| v != x[(0, j)]));

    let mut coefficients = vec![0.0; p];
    let mut rank = 0;

    if !active.is_empty() {
        let centered = DMatrix::from_fn(n, active.len(), |i, k| {
            let j = active[k];
            x[(i, j)] - x_means[j]
        });
        let y_centered = y.map(|v| v - y_mean);

        let svd = centered
            .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
            .ok_or_else(|| FitError::Solver("SVD did not converge".to_string()))?;
        // Same cutoff as LAPACK's gelsd default (rcond = eps * max(n, p))
        let eps = svd.singular_values.max() * f64::EPSILON * n.max(active.len()) as f64;
        rank = svd.rank(eps);

        let beta = svd
            .solve(&y_centered, eps)
            .map_err(|e| FitError::Solver(e.to_string()))?;
        for (k, &j) in active.iter().enumerate() {
            coefficients[j] = beta[k];
        }
    }

    let intercept = y_mean
        - x_means
            .iter()
            .zip(&coefficients)
            .map(|(m, c)| m * c)
            .sum::<f64>();

    Ok(LeastSquares {
        intercept,
        coefficients,
        rank,
        constant_columns,
    })
}

/// Fit `target` against `features` over every record of `table`
///
/// # Example
/// ```no_run
/// use gasfit::dataset::GasTable;
/// use gasfit::features::{FeatureSet, Target};
/// use gasfit::regression::{fit, FitThresholds};
///
/// # fn main() -> anyhow::Result<()> {
/// let table = GasTable::from_path("gas_benchmark_results.csv")?;
/// let report = fit(&table, Target::TotalGas, &FeatureSet::new(true), &FitThresholds::default())?;
/// println!("R² = {:.4}", report.r2);
/// # Ok(())
/// # }
/// ```
pub fn fit(
    table: &GasTable,
    target: Target,
    features: &FeatureSet,
    thresholds: &FitThresholds,
) -> Result<FitReport, FitError> {
    features.validate_schema(table.columns())?;

    let n = table.len();
    let p = features.len();
    if n < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_SAMPLES,
            actual: n,
        });
    }

    let rows: Vec<Vec<f64>> = table.records().iter().map(|r| features.row(r)).collect();
    let actual: Vec<f64> = table.records().iter().map(|r| target.value(r)).collect();

    let x = DMatrix::from_fn(n, p, |i, j| rows[i][j]);
    let y = DVector::from_column_slice(&actual);
    let solution = solve_least_squares(&x, &y)?;

    let constant_features: Vec<_> = solution
        .constant_columns
        .iter()
        .map(|&j| features.features()[j])
        .collect();
    for feature in &constant_features {
        tracing::warn!(
            "Feature {} is constant across the data; coefficient fixed at 0",
            feature
        );
    }

    let varying = p - constant_features.len();
    if solution.rank < varying {
        tracing::warn!(
            "Design matrix is rank deficient (rank {} < {} varying features); \
             coefficients are the minimum-norm solution",
            solution.rank,
            varying
        );
    }

    let model = LinearModel::new(
        target,
        features.clone(),
        solution.intercept,
        solution.coefficients,
    )?;
    let predictions: Vec<f64> = rows.iter().map(|row| model.predict_row(row)).collect();

    let r2 = r2_score(&actual, &predictions);
    let mape = mean_absolute_percentage_error(&actual, &predictions);
    tracing::debug!(
        "Fitted {} on {} rows: R²={:.4}, MAPE={:.2}%",
        target,
        n,
        r2,
        mape
    );

    Ok(FitReport {
        model,
        actual,
        predictions,
        r2,
        mape,
        rank: solution.rank,
        constant_features,
        assessment: QualityAssessment::new(r2, mape, *thresholds),
    })
}
