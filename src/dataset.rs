//! Gas benchmark CSV loader
//!
//! Reads the results table written by the gas benchmark suite, checks the
//! header against the required columns, parses the categorical labels into
//! closed enums and derives the `FilterBytes` feature.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Columns every benchmark table must carry (extra columns are ignored)
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Operation",
    "FilterComplexity",
    "Rows",
    "Columns",
    "OpenJobGas",
    "PushRowTotal",
    "PushRowAvg",
    "FinalizeGas",
    "TotalGas",
];

/// Errors that can occur while loading a benchmark table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File '{}' not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: unknown {column} label '{value}'")]
    UnknownLabel {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: {column} must be a non-negative number, got {value}")]
    NegativeValue {
        line: usize,
        column: &'static str,
        value: f64,
    },

    #[error("No data rows after header")]
    Empty,
}

/// A label that is not part of a closed categorical set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown label '{0}'")]
pub struct UnknownLabel(pub String);

/// Aggregation performed by a benchmarked job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Count,
    Sum,
    AvgP,
    WeightedSum,
    Min,
    Max,
}

impl Operation {
    /// All operations in declaration order
    pub const ALL: [Operation; 6] = [
        Operation::Count,
        Operation::Sum,
        Operation::AvgP,
        Operation::WeightedSum,
        Operation::Min,
        Operation::Max,
    ];

    /// Reference category of the one-hot encoding (no indicator column)
    pub const REFERENCE: Operation = Operation::Count;

    /// Label as written in the benchmark CSV
    pub fn label(self) -> &'static str {
        match self {
            Operation::Count => "COUNT",
            Operation::Sum => "SUM",
            Operation::AvgP => "AVG_P",
            Operation::WeightedSum => "WEIGHTED_SUM",
            Operation::Min => "MIN",
            Operation::Max => "MAX",
        }
    }

    /// Name of the indicator feature for this operation
    pub fn indicator_name(self) -> &'static str {
        match self {
            Operation::Count => "Op_COUNT",
            Operation::Sum => "Op_SUM",
            Operation::AvgP => "Op_AVG_P",
            Operation::WeightedSum => "Op_WEIGHTED_SUM",
            Operation::Min => "Op_MIN",
            Operation::Max => "Op_MAX",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.label() == s.trim())
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Complexity class of the row filter attached to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterComplexity {
    None,
    Simple,
    Medium,
    Complex,
}

impl FilterComplexity {
    pub const ALL: [FilterComplexity; 4] = [
        FilterComplexity::None,
        FilterComplexity::Simple,
        FilterComplexity::Medium,
        FilterComplexity::Complex,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterComplexity::None => "none",
            FilterComplexity::Simple => "simple",
            FilterComplexity::Medium => "medium",
            FilterComplexity::Complex => "complex",
        }
    }

    /// Approximate filter bytecode length for this complexity class
    pub fn filter_bytes(self) -> u32 {
        match self {
            FilterComplexity::None => 0,
            FilterComplexity::Simple => 7,
            FilterComplexity::Medium => 15,
            FilterComplexity::Complex => 30,
        }
    }
}

impl fmt::Display for FilterComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterComplexity {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterComplexity::ALL
            .into_iter()
            .find(|fc| fc.label() == s.trim())
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// CSV row before label validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecord {
    operation: String,
    filter_complexity: String,
    rows: u64,
    columns: u64,
    open_job_gas: f64,
    push_row_total: f64,
    push_row_avg: f64,
    finalize_gas: f64,
    total_gas: f64,
}

/// One benchmark observation
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    pub operation: Operation,
    pub filter_complexity: FilterComplexity,
    pub rows: u64,
    pub columns: u64,
    pub open_job_gas: f64,
    pub push_row_total: f64,
    pub push_row_avg: f64,
    pub finalize_gas: f64,
    pub total_gas: f64,
}

impl BenchmarkRecord {
    /// Derived `FilterBytes` feature
    pub fn filter_bytes(&self) -> u32 {
        self.filter_complexity.filter_bytes()
    }

    fn from_raw(raw: RawRecord, line: usize) -> Result<Self, LoadError> {
        let operation = raw
            .operation
            .parse::<Operation>()
            .map_err(|e| LoadError::UnknownLabel {
                line,
                column: "Operation",
                value: e.0,
            })?;
        let filter_complexity = raw
            .filter_complexity
            .parse::<FilterComplexity>()
            .map_err(|e| LoadError::UnknownLabel {
                line,
                column: "FilterComplexity",
                value: e.0,
            })?;

        for (column, value) in [
            ("OpenJobGas", raw.open_job_gas),
            ("PushRowTotal", raw.push_row_total),
            ("PushRowAvg", raw.push_row_avg),
            ("FinalizeGas", raw.finalize_gas),
            ("TotalGas", raw.total_gas),
        ] {
            // also rejects NaN
            if !(value >= 0.0) || value.is_infinite() {
                return Err(LoadError::NegativeValue {
                    line,
                    column,
                    value,
                });
            }
        }

        Ok(Self {
            operation,
            filter_complexity,
            rows: raw.rows,
            columns: raw.columns,
            open_job_gas: raw.open_job_gas,
            push_row_total: raw.push_row_total,
            push_row_avg: raw.push_row_avg,
            finalize_gas: raw.finalize_gas,
            total_gas: raw.total_gas,
        })
    }
}

/// In-memory benchmark table
#[derive(Debug, Clone)]
pub struct GasTable {
    columns: Vec<String>,
    records: Vec<BenchmarkRecord>,
}

impl GasTable {
    /// Load a benchmark table from a CSV file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gasfit::dataset::GasTable;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let table = GasTable::from_path("gas_benchmark_results.csv")?;
    /// println!("Loaded {} test cases", table.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;

        tracing::info!(
            "Loaded {} records from {}",
            table.records.len(),
            path.display()
        );
        Ok(table)
    }

    /// Load a benchmark table from any reader producing CSV text
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        tracing::debug!("CSV columns: {:?}", columns);

        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(LoadError::MissingColumn(required));
            }
        }

        let mut records = Vec::new();
        for (idx, raw) in reader.deserialize::<RawRecord>().enumerate() {
            // header is line 1
            let line = idx + 2;
            records.push(BenchmarkRecord::from_raw(raw?, line)?);
        }

        if records.is_empty() {
            return Err(LoadError::Empty);
        }

        Ok(Self { columns, records })
    }

    /// Build a table directly from records (header is the required column set)
    pub fn from_records(records: Vec<BenchmarkRecord>) -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Operations that occur in the table, in declaration order
    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.records.iter().any(|r| r.operation == *op))
            .collect()
    }

    /// Filter complexities that occur in the table, in declaration order
    pub fn filter_complexities(&self) -> Vec<FilterComplexity> {
        FilterComplexity::ALL
            .into_iter()
            .filter(|fc| self.records.iter().any(|r| r.filter_complexity == *fc))
            .collect()
    }

    /// Render the first `n` records as a fixed-width text table
    pub fn preview(&self, n: usize) -> String {
        let mut out = format!(
            "{:>4} {:<13} {:<16} {:>6} {:>7} {:>11} {:>12} {:>10} {:>11} {:>11} {:>11}\n",
            "",
            "Operation",
            "FilterComplexity",
            "Rows",
            "Columns",
            "OpenJobGas",
            "PushRowTotal",
            "PushRowAvg",
            "FinalizeGas",
            "TotalGas",
            "FilterBytes"
        );
        for (i, r) in self.records.iter().take(n).enumerate() {
            out.push_str(&format!(
                "{:>4} {:<13} {:<16} {:>6} {:>7} {:>11.0} {:>12.0} {:>10.0} {:>11.0} {:>11.0} {:>11}\n",
                i,
                r.operation.label(),
                r.filter_complexity.label(),
                r.rows,
                r.columns,
                r.open_job_gas,
                r.push_row_total,
                r.push_row_avg,
                r.finalize_gas,
                r.total_gas,
                r.filter_bytes()
            ));
        }
        out
    }
}
