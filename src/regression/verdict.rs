// Fit report and quality assessment
//
// The assessment never changes control flow: a model that misses its
// targets is reported and still used downstream.

use crate::features::Feature;
use crate::regression::config::FitThresholds;
use crate::regression::model::LinearModel;
use crate::report::format_gas;
use std::fmt::Write as _;

/// Fit statistics checked against thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityAssessment {
    pub r2: f64,
    pub mape: f64,
    pub thresholds: FitThresholds,
}

impl QualityAssessment {
    pub fn new(r2: f64, mape: f64, thresholds: FitThresholds) -> Self {
        Self {
            r2,
            mape,
            thresholds,
        }
    }

    pub fn meets_r2(&self) -> bool {
        self.r2 >= self.thresholds.min_r2
    }

    pub fn meets_mape(&self) -> bool {
        self.mape <= self.thresholds.max_mape
    }

    pub fn passed(&self) -> bool {
        self.meets_r2() && self.meets_mape()
    }
}

/// Outcome of fitting one target
#[derive(Debug, Clone)]
pub struct FitReport {
    pub model: LinearModel,
    /// Target values of the training rows
    pub actual: Vec<f64>,
    /// In-sample predictions, same order as `actual`
    pub predictions: Vec<f64>,
    pub r2: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
    /// Numerical rank of the varying feature columns
    pub rank: usize,
    /// Features pinned to 0 because they never vary in the data
    pub constant_features: Vec<Feature>,
    pub assessment: QualityAssessment,
}

impl FitReport {
    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        let t = &self.assessment.thresholds;

        report.push_str("Model Performance:\n");
        let _ = writeln!(
            report,
            "  R² Score:  {:.4} ({:.1}% variance explained)",
            self.r2,
            self.r2 * 100.0
        );
        let _ = writeln!(report, "  MAPE:      {:.2}%", self.mape);
        let _ = writeln!(
            report,
            "  Target:    R² ≥ {:.2}, MAPE ≤ {}%",
            t.min_r2, t.max_mape
        );

        if self.assessment.meets_r2() {
            report.push_str("  ✓ Model meets R² target!\n");
        } else {
            report.push_str("  ✗ Model below R² target\n");
        }

        if self.assessment.meets_mape() {
            report.push_str("  ✓ Model meets MAPE target!\n");
        } else {
            report.push_str("  ✗ Model above MAPE target - consider more terms\n");
        }

        if !self.constant_features.is_empty() {
            let names: Vec<_> = self.constant_features.iter().map(|f| f.name()).collect();
            let _ = writeln!(
                report,
                "  Note: constant in data, coefficient fixed at 0: {}",
                names.join(", ")
            );
        }

        report.push_str("\nModel Coefficients:\n");
        let _ = writeln!(
            report,
            "  Intercept: {} gas\n",
            format_gas(self.model.intercept())
        );
        let _ = writeln!(report, "{:>16} {:>16}", "Feature", "Coefficient");
        for (feature, coefficient) in self.model.coefficient_table() {
            let _ = writeln!(report, "{:>16} {:>16.4}", feature.name(), coefficient);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSet, Target};

    fn report(r2: f64, mape: f64) -> FitReport {
        let model = LinearModel::new(
            Target::TotalGas,
            FeatureSet::new(false),
            12345.6,
            vec![50.0, 200.0, -3.0, 400.0, 0.0, 900.0, -10.0, 10.0],
        )
        .unwrap();
        FitReport {
            model,
            actual: vec![],
            predictions: vec![],
            r2,
            mape,
            rank: 8,
            constant_features: vec![],
            assessment: QualityAssessment::new(r2, mape, FitThresholds::default()),
        }
    }

    #[test]
    fn test_assessment_thresholds_inclusive() {
        let a = QualityAssessment::new(0.60, 40.0, FitThresholds::default());
        assert!(a.meets_r2());
        assert!(a.meets_mape());
        assert!(a.passed());

        let a = QualityAssessment::new(0.59, 40.1, FitThresholds::default());
        assert!(!a.meets_r2());
        assert!(!a.meets_mape());
        assert!(!a.passed());
    }

    #[test]
    fn test_report_string_passing() {
        let text = report(0.95, 5.0).to_report_string();
        assert!(text.contains("R² Score:  0.9500 (95.0% variance explained)"));
        assert!(text.contains("MAPE:      5.00%"));
        assert!(text.contains("Target:    R² ≥ 0.60, MAPE ≤ 40%"));
        assert!(text.contains("✓ Model meets R² target!"));
        assert!(text.contains("✓ Model meets MAPE target!"));
        assert!(text.contains("Intercept: 12,346 gas"));
    }

    #[test]
    fn test_report_string_failing() {
        let text = report(0.2, 75.0).to_report_string();
        assert!(text.contains("✗ Model below R² target"));
        assert!(text.contains("✗ Model above MAPE target - consider more terms"));
    }

    #[test]
    fn test_report_lists_coefficients_in_order() {
        let text = report(0.9, 1.0).to_report_string();
        let ws = text.find("Op_WEIGHTED_SUM").unwrap();
        let min = text.find("Op_MIN").unwrap();
        assert!(ws < min);
    }

    #[test]
    fn test_report_mentions_constant_features() {
        let mut r = report(0.9, 1.0);
        r.constant_features = vec![Feature::Operation(crate::dataset::Operation::Max)];
        assert!(r.to_report_string().contains("coefficient fixed at 0: Op_MAX"));
    }
}
