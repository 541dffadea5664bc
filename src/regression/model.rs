// Fitted linear cost model

use crate::dataset::BenchmarkRecord;
use crate::features::{Feature, FeatureSet, Target};
use crate::regression::ols::FitError;

/// Intercept plus one coefficient per feature; immutable once fitted
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    target: Target,
    features: FeatureSet,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    /// Assemble a model from known parameters
    ///
    /// # Example
    /// ```
    /// use gasfit::features::{FeatureSet, Target};
    /// use gasfit::regression::LinearModel;
    ///
    /// let features = FeatureSet::new(false);
    /// let coefficients = vec![5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    /// let model = LinearModel::new(Target::TotalGas, features, 100.0, coefficients).unwrap();
    /// assert_eq!(model.predict_row(&[10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]), 150.0);
    /// ```
    pub fn new(
        target: Target,
        features: FeatureSet,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, FitError> {
        if coefficients.len() != features.len() {
            return Err(FitError::CoefficientCount {
                expected: features.len(),
                actual: coefficients.len(),
            });
        }

        Ok(Self {
            target,
            features,
            intercept,
            coefficients,
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of a feature, `None` if the model was fitted without it
    pub fn coefficient(&self, feature: Feature) -> Option<f64> {
        self.features
            .position(feature)
            .map(|idx| self.coefficients[idx])
    }

    /// intercept + Σ coefficientᵢ · xᵢ
    pub fn predict_row(&self, x: &[f64]) -> f64 {
        self.intercept
            + x.iter()
                .zip(&self.coefficients)
                .map(|(x, c)| x * c)
                .sum::<f64>()
    }

    pub fn predict(&self, record: &BenchmarkRecord) -> f64 {
        self.predict_row(&self.features.row(record))
    }

    /// Features paired with their coefficients, largest signed value first
    pub fn coefficient_table(&self) -> Vec<(Feature, f64)> {
        let mut table: Vec<(Feature, f64)> = self
            .features
            .features()
            .iter()
            .copied()
            .zip(self.coefficients.iter().copied())
            .collect();
        // stable: ties keep declaration order
        table.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{FilterComplexity, Operation};

    fn model() -> LinearModel {
        // Rows, Columns, FilterBytes, Op_SUM, Op_AVG_P, Op_WEIGHTED_SUM, Op_MIN, Op_MAX
        LinearModel::new(
            Target::TotalGas,
            FeatureSet::new(false),
            1000.0,
            vec![50.0, 200.0, -3.0, 400.0, 0.0, 900.0, -10.0, 10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_coefficient_count_mismatch() {
        let err = LinearModel::new(Target::TotalGas, FeatureSet::new(true), 0.0, vec![1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            FitError::CoefficientCount {
                expected: 9,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_coefficient_lookup() {
        let m = model();
        assert_eq!(m.coefficient(Feature::Rows), Some(50.0));
        assert_eq!(
            m.coefficient(Feature::Operation(Operation::WeightedSum)),
            Some(900.0)
        );
        assert_eq!(m.coefficient(Feature::RowsTimesColumns), None);
        assert_eq!(m.coefficient(Feature::Operation(Operation::Count)), None);
    }

    #[test]
    fn test_predict_record() {
        let record = BenchmarkRecord {
            operation: Operation::Sum,
            filter_complexity: FilterComplexity::Simple,
            rows: 10,
            columns: 3,
            open_job_gas: 0.0,
            push_row_total: 0.0,
            push_row_avg: 0.0,
            finalize_gas: 0.0,
            total_gas: 0.0,
        };
        // 1000 + 10*50 + 3*200 - 7*3 + 400
        assert_eq!(model().predict(&record), 2479.0);
    }

    #[test]
    fn test_coefficient_table_sorted_descending() {
        let table = model().coefficient_table();
        let names: Vec<_> = table.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "Op_WEIGHTED_SUM",
                "Op_SUM",
                "Columns",
                "Rows",
                "Op_MAX",
                "Op_AVG_P",
                "FilterBytes",
                "Op_MIN"
            ]
        );
    }
}
