// Fit quality metrics
//
// Same definitions as scikit-learn's `r2_score` and
// `mean_absolute_percentage_error`, with MAPE expressed in percent.

/// Coefficient of determination: 1 - SS_res / SS_tot
///
/// A constant target (SS_tot = 0) scores 1.0 when predicted exactly and 0.0
/// otherwise. Empty input yields NaN.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = residuals(actual, predicted).iter().map(|r| r * r).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean of |y - ŷ| / max(|y|, ε), in percent
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return f64::NAN;
    }

    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).abs() / y.abs().max(f64::EPSILON))
        .sum();
    total / actual.len() as f64 * 100.0
}

/// Element-wise y - ŷ
pub fn residuals(actual: &[f64], predicted: &[f64]) -> Vec<f64> {
    actual.iter().zip(predicted).map(|(y, p)| y - p).collect()
}
