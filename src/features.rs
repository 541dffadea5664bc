//! Statically declared regression features and targets
//!
//! The feature list is fixed up front rather than derived from whatever
//! categories happen to appear in the data: `Rows`, `Columns`,
//! `FilterBytes`, optionally `Rows_x_Columns`, and one indicator per
//! operation except the reference category (COUNT).

use crate::dataset::{BenchmarkRecord, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A feature column absent from the loaded table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("feature '{feature}' requires column '{column}', which is not in the table header")]
pub struct MissingFeatureColumn {
    pub feature: &'static str,
    pub column: &'static str,
}

/// Column the regression predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    TotalGas,
    PushRowTotal,
}

impl Target {
    pub fn column(self) -> &'static str {
        match self {
            Target::TotalGas => "TotalGas",
            Target::PushRowTotal => "PushRowTotal",
        }
    }

    pub fn value(self, record: &BenchmarkRecord) -> f64 {
        match self {
            Target::TotalGas => record.total_gas,
            Target::PushRowTotal => record.push_row_total,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TotalGas" => Ok(Target::TotalGas),
            "PushRowTotal" => Ok(Target::PushRowTotal),
            other => Err(format!(
                "unknown target '{}' (expected TotalGas or PushRowTotal)",
                other
            )),
        }
    }
}

/// One predictor column of the design matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Rows,
    Columns,
    FilterBytes,
    RowsTimesColumns,
    /// One-hot indicator for a non-reference operation
    Operation(Operation),
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Rows => "Rows",
            Feature::Columns => "Columns",
            Feature::FilterBytes => "FilterBytes",
            Feature::RowsTimesColumns => "Rows_x_Columns",
            Feature::Operation(op) => op.indicator_name(),
        }
    }

    /// Table columns this feature is computed from
    pub fn source_columns(self) -> &'static [&'static str] {
        match self {
            Feature::Rows => &["Rows"],
            Feature::Columns => &["Columns"],
            Feature::FilterBytes => &["FilterComplexity"],
            Feature::RowsTimesColumns => &["Rows", "Columns"],
            Feature::Operation(_) => &["Operation"],
        }
    }

    pub fn value(self, record: &BenchmarkRecord) -> f64 {
        match self {
            Feature::Rows => record.rows as f64,
            Feature::Columns => record.columns as f64,
            Feature::FilterBytes => f64::from(record.filter_bytes()),
            Feature::RowsTimesColumns => record.rows as f64 * record.columns as f64,
            Feature::Operation(op) => {
                if record.operation == op {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of features used to build the design matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    /// Standard feature list, with or without the `Rows_x_Columns` term
    pub fn new(include_interaction: bool) -> Self {
        let mut features = vec![Feature::Rows, Feature::Columns, Feature::FilterBytes];
        if include_interaction {
            features.push(Feature::RowsTimesColumns);
        }
        features.extend(
            Operation::ALL
                .into_iter()
                .filter(|op| *op != Operation::REFERENCE)
                .map(Feature::Operation),
        );
        Self { features }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn has_interaction(&self) -> bool {
        self.features.contains(&Feature::RowsTimesColumns)
    }

    pub fn position(&self, feature: Feature) -> Option<usize> {
        self.features.iter().position(|f| *f == feature)
    }

    /// Check every feature's source columns against a table header
    pub fn validate_schema(&self, columns: &[String]) -> Result<(), MissingFeatureColumn> {
        for feature in &self.features {
            for &column in feature.source_columns() {
                if !columns.iter().any(|c| c == column) {
                    return Err(MissingFeatureColumn {
                        feature: feature.name(),
                        column,
                    });
                }
            }
        }
        Ok(())
    }

    /// Feature vector for a single record, in declaration order
    pub fn row(&self, record: &BenchmarkRecord) -> Vec<f64> {
        self.features.iter().map(|f| f.value(record)).collect()
    }
}
