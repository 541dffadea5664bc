//! Descriptive statistics over a benchmark table
//!
//! Grouped TotalGas aggregates, gas phase breakdown, and per-row push cost
//! analysis. Aggregates are computed in f64: gas totals run into the tens of
//! millions, past the range f32 holds exactly.

use crate::dataset::{BenchmarkRecord, FilterComplexity, GasTable, Operation};
use nalgebra::DVector;
use std::fmt::Write as _;

/// Aggregate statistics of one group of gas values
#[derive(Debug, Clone, PartialEq)]
pub struct GasSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1); undefined for a single sample
    pub std: Option<f64>,
}

impl GasSummary {
    /// Summarize a slice of values, `None` if it is empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let v = DVector::from_column_slice(values);

        // variance() is the two-pass population form; rescale to the sample form
        let n = values.len() as f64;
        let std = (values.len() > 1).then(|| (v.variance() * n / (n - 1.0)).sqrt());
        let (mean, min, max) = (v.mean(), v.min(), v.max());

        Some(Self {
            count: values.len(),
            mean,
            min,
            max,
            std,
        })
    }
}

/// Average cost of each gas phase
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBreakdown {
    pub open_job: f64,
    pub push_row_total: f64,
    pub finalize: f64,
    pub total: f64,
}

impl PhaseBreakdown {
    pub fn from_table(table: &GasTable) -> Self {
        Self {
            open_job: column_mean(table, |r| r.open_job_gas),
            push_row_total: column_mean(table, |r| r.push_row_total),
            finalize: column_mean(table, |r| r.finalize_gas),
            total: column_mean(table, |r| r.total_gas),
        }
    }

    /// Share of the average total, in percent
    pub fn percent_of_total(&self, phase_mean: f64) -> Option<f64> {
        (self.total > 0.0).then(|| phase_mean / self.total * 100.0)
    }
}

/// Per-row push cost for one operation
#[derive(Debug, Clone, PartialEq)]
pub struct PerRowCost {
    pub operation: Operation,
    pub mean: f64,
    pub std: Option<f64>,
}

/// Everything the descriptive stage reports
#[derive(Debug, Clone)]
pub struct DescriptiveReport {
    pub by_operation: Vec<(Operation, GasSummary)>,
    pub by_filter: Vec<(FilterComplexity, GasSummary)>,
    pub phases: PhaseBreakdown,
    pub per_row: Vec<PerRowCost>,
    /// Per-row cost relative to COUNT, sorted descending; `None` when COUNT
    /// is absent or its mean per-row cost is zero
    pub relative_to_count: Option<Vec<(Operation, f64)>>,
}

impl DescriptiveReport {
    pub fn from_table(table: &GasTable) -> Self {
        let by_operation = table
            .operations()
            .into_iter()
            .filter_map(|op| {
                let values: Vec<f64> = table
                    .records()
                    .iter()
                    .filter(|r| r.operation == op)
                    .map(|r| r.total_gas)
                    .collect();
                GasSummary::from_values(&values).map(|s| (op, s))
            })
            .collect();

        let by_filter = table
            .filter_complexities()
            .into_iter()
            .filter_map(|fc| {
                let values: Vec<f64> = table
                    .records()
                    .iter()
                    .filter(|r| r.filter_complexity == fc)
                    .map(|r| r.total_gas)
                    .collect();
                GasSummary::from_values(&values).map(|s| (fc, s))
            })
            .collect();

        let per_row: Vec<PerRowCost> = table
            .operations()
            .into_iter()
            .filter_map(|op| {
                let values: Vec<f64> = table
                    .records()
                    .iter()
                    .filter(|r| r.operation == op)
                    .map(|r| r.push_row_avg)
                    .collect();
                GasSummary::from_values(&values).map(|s| PerRowCost {
                    operation: op,
                    mean: s.mean,
                    std: s.std,
                })
            })
            .collect();

        let relative_to_count = relative_costs(&per_row);
        if relative_to_count.is_none() {
            tracing::warn!("COUNT baseline unavailable; skipping relative per-row costs");
        }

        Self {
            by_operation,
            by_filter,
            phases: PhaseBreakdown::from_table(table),
            per_row,
            relative_to_count,
        }
    }

    /// Grouped statistics and phase breakdown
    pub fn statistics_report(&self) -> String {
        let mut out = String::new();

        out.push_str("Total Gas by Operation:\n");
        out.push_str(&summary_table("Operation", &self.by_operation));

        out.push_str("\n\nTotal Gas by Filter Complexity:\n");
        out.push_str(&summary_table("FilterComplexity", &self.by_filter));

        out.push_str("\n\nGas Phase Breakdown (averages):\n");
        let p = &self.phases;
        for (label, value) in [
            ("OpenJob:      ", p.open_job),
            ("PushRow Total:", p.push_row_total),
            ("Finalize:     ", p.finalize),
        ] {
            let share = p
                .percent_of_total(value)
                .map_or_else(|| "n/a".to_string(), |pct| format!("{:.1}%", pct));
            let _ = writeln!(out, "  {} {} gas ({})", label, format_gas(value), share);
        }
        let _ = writeln!(out, "  Total:         {} gas", format_gas(p.total));

        out
    }

    /// Per-row push cost by operation, and relative to COUNT
    pub fn per_row_report(&self) -> String {
        let mut out = String::from("Average gas per row by operation:\n");
        let _ = writeln!(out, "{:<14} {:>12} {:>12}", "Operation", "mean", "std");
        for cost in &self.per_row {
            let _ = writeln!(
                out,
                "{:<14} {:>12} {:>12}",
                cost.operation.label(),
                format_gas(cost.mean),
                format_std(cost.std)
            );
        }

        match &self.relative_to_count {
            Some(relative) => {
                out.push_str("\nRelative to COUNT (1.0x):\n");
                for (op, ratio) in relative {
                    let _ = writeln!(out, "{:<14} {:>8.2}x", op.label(), ratio);
                }
            }
            None => out.push_str("\nRelative costs unavailable (no COUNT baseline)\n"),
        }

        out
    }
}

fn column_mean(table: &GasTable, field: impl Fn(&BenchmarkRecord) -> f64) -> f64 {
    let data: Vec<f64> = table.records().iter().map(field).collect();
    DVector::from_vec(data).mean()
}

fn relative_costs(per_row: &[PerRowCost]) -> Option<Vec<(Operation, f64)>> {
    let baseline = per_row
        .iter()
        .find(|c| c.operation == Operation::REFERENCE)?
        .mean;
    if baseline <= 0.0 {
        return None;
    }

    let mut relative: Vec<(Operation, f64)> = per_row
        .iter()
        .map(|c| (c.operation, c.mean / baseline))
        .collect();
    relative.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Some(relative)
}

fn summary_table<K: std::fmt::Display>(key: &str, rows: &[(K, GasSummary)]) -> String {
    let mut out = format!(
        "{:<17} {:>6} {:>12} {:>12} {:>12} {:>12}\n",
        key, "count", "mean", "min", "max", "std"
    );
    for (k, s) in rows {
        let _ = writeln!(
            out,
            "{:<17} {:>6} {:>12} {:>12} {:>12} {:>12}",
            k.to_string(),
            s.count,
            format_gas(s.mean),
            format_gas(s.min),
            format_gas(s.max),
            format_std(s.std)
        );
    }
    out
}

fn format_std(std: Option<f64>) -> String {
    std.map_or_else(|| "NaN".to_string(), format_gas)
}

/// Round to whole gas units with thousands separators (`1234567.4` → `1,234,567`)
pub fn format_gas(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // {:.0} rounds halves to even
    let rounded = format!("{:.0}", value);
    let digits = rounded.trim_start_matches('-');
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.starts_with('-') && digits.bytes().any(|b| b != b'0') {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
