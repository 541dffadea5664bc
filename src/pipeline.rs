//! End-to-end analysis run
//!
//! Load → describe → fit → plot → generate. Each stage takes the previous
//! stage's output explicitly; the only side effects are the text written to
//! `out` and the two output files.

use crate::codegen::EstimatorCode;
use crate::config::AnalysisConfig;
use crate::dataset::GasTable;
use crate::features::{FeatureSet, Target};
use crate::plot;
use crate::regression::{self, FitReport};
use crate::report::DescriptiveReport;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 60;

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub descriptive: DescriptiveReport,
    /// TotalGas fit; drives the plot and the estimator
    pub primary: FitReport,
    pub secondary: Vec<FitReport>,
    pub estimator: EstimatorCode,
    pub plot_path: PathBuf,
    pub estimator_path: PathBuf,
}

/// Run the full analysis of `input`, writing progress text to `out`
///
/// The input is loaded and validated before any output file is touched.
pub fn run(config: &AnalysisConfig, input: &Path, out: &mut dyn Write) -> Result<AnalysisOutcome> {
    banner(out, "Loading data...")?;
    let table = GasTable::from_path(input)?;
    writeln!(out, "Loaded {} test cases", table.len())?;
    writeln!(out, "\nColumns: {:?}", table.columns())?;
    writeln!(out, "\nData preview:")?;
    write!(out, "{}", table.preview(config.preview_rows))?;

    let descriptive = DescriptiveReport::from_table(&table);
    banner(out, "Basic Statistics")?;
    write!(out, "{}", descriptive.statistics_report())?;

    banner(out, "Per-Row Cost Analysis")?;
    write!(out, "{}", descriptive.per_row_report())?;

    let features = FeatureSet::new(config.include_interaction);
    let primary = fit_target(config, &table, Target::TotalGas, &features, out)?;

    let mut secondary = Vec::with_capacity(config.secondary_targets.len());
    for &target in &config.secondary_targets {
        writeln!(out, "\n\n--- Analyzing {} Costs ---", target)?;
        secondary.push(fit_target(config, &table, target, &features, out)?);
    }

    banner(out, "Generating Visualizations")?;
    ensure_parent(&config.plot_path)?;
    plot::render_diagnostics(
        &table,
        &primary,
        &config.plot_path,
        (config.plot_width, config.plot_height),
    )
    .with_context(|| format!("Failed to render {}", config.plot_path.display()))?;
    writeln!(out, "Saved visualization to: {}", config.plot_path.display())?;

    banner(out, "Gas Estimator Function (TypeScript)")?;
    let estimator = EstimatorCode::from_model(&primary.model);
    writeln!(out, "{}", estimator.render())?;
    ensure_parent(&config.estimator_path)?;
    estimator.write_to(&config.estimator_path)?;
    writeln!(
        out,
        "\nSaved estimator function to: {}",
        config.estimator_path.display()
    )?;

    banner(out, "Analysis Complete!")?;
    writeln!(out, "Generated files:")?;
    writeln!(out, "  - {} (visualizations)", config.plot_path.display())?;
    writeln!(out, "  - {} (estimator function)", config.estimator_path.display())?;
    writeln!(out, "\nNext steps:")?;
    writeln!(
        out,
        "  1. Review R² score (target: ≥{:.2})",
        config.thresholds.min_r2
    )?;
    writeln!(out, "  2. Check MAPE (target: ≤{}%)", config.thresholds.max_mape)?;
    writeln!(
        out,
        "  3. Use {} in your application",
        config.estimator_path.display()
    )?;
    writeln!(out, "  4. Validate with holdout test cases")?;

    Ok(AnalysisOutcome {
        descriptive,
        primary,
        secondary,
        estimator,
        plot_path: config.plot_path.clone(),
        estimator_path: config.estimator_path.clone(),
    })
}

fn fit_target(
    config: &AnalysisConfig,
    table: &GasTable,
    target: Target,
    features: &FeatureSet,
    out: &mut dyn Write,
) -> Result<FitReport> {
    let title = if features.has_interaction() {
        format!(
            "Building Regression Model for {}\n(with Rows × Columns interaction)",
            target
        )
    } else {
        format!("Building Regression Model for {}", target)
    };
    banner(out, &title)?;

    let report = regression::fit(table, target, features, &config.thresholds)
        .with_context(|| format!("Failed to fit model for {}", target))?;
    write!(out, "{}", report.to_report_string())?;

    if !report.assessment.passed() {
        tracing::warn!(
            "{} model misses its quality targets (R²={:.4}, MAPE={:.2}%)",
            target,
            report.r2,
            report.mape
        );
    }
    Ok(report)
}

fn banner(out: &mut dyn Write, title: &str) -> Result<()> {
    let rule = "=".repeat(BANNER_WIDTH);
    writeln!(out, "\n{}\n{}\n{}\n", rule, title, rule)?;
    Ok(())
}

/// Create the parent directory of an output path if it is missing
fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "\
Operation,FilterComplexity,Rows,Columns,OpenJobGas,PushRowTotal,PushRowAvg,FinalizeGas,TotalGas
COUNT,none,10,1,50000,20000,2000,30000,100000
COUNT,simple,20,2,50000,41000,2050,30000,121000
SUM,medium,30,3,50000,66000,2200,31000,147000
SUM,complex,40,4,50000,92000,2300,31000,173000
AVG_P,none,50,5,50000,125000,2500,32000,207000
AVG_P,simple,15,2,50000,39000,2600,32000,121000
MIN,medium,25,4,50000,55000,2200,30000,135000
MAX,complex,35,1,50000,77000,2200,30000,157000
WEIGHTED_SUM,none,45,3,50000,117000,2600,33000,200000
WEIGHTED_SUM,medium,12,5,50000,33600,2800,33000,116600
COUNT,complex,60,2,50000,118000,1967,30000,198000
SUM,simple,8,5,50000,18400,2300,31000,99400
";

    fn config_in(dir: &Path) -> AnalysisConfig {
        AnalysisConfig {
            plot_path: dir.join("gas_analysis.svg"),
            estimator_path: dir.join("estimateJobGas.ts"),
            plot_width: 600,
            plot_height: 480,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_writes_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("results.csv");
        fs::write(&input, CSV).unwrap();
        let config = config_in(temp_dir.path());

        let mut out = Vec::new();
        let outcome = run(&config, &input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Loaded 12 test cases"));
        assert!(text.contains("Building Regression Model for TotalGas"));
        assert!(text.contains("--- Analyzing PushRowTotal Costs ---"));
        assert!(text.contains("Analysis Complete!"));
        assert_eq!(outcome.secondary.len(), 1);
        assert_eq!(outcome.secondary[0].model.target(), Target::PushRowTotal);

        let code = fs::read_to_string(&config.estimator_path).unwrap();
        assert_eq!(code, outcome.estimator.render());
        let svg = fs::read_to_string(&config.plot_path).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());

        let mut out = Vec::new();
        let err = run(&config, &temp_dir.path().join("missing.csv"), &mut out).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(!config.plot_path.exists());
        assert!(!config.estimator_path.exists());
    }

    #[test]
    fn test_creates_output_directories() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("results.csv");
        fs::write(&input, CSV).unwrap();
        let config = AnalysisConfig {
            estimator_path: temp_dir.path().join("generated/estimateJobGas.ts"),
            secondary_targets: vec![],
            ..config_in(temp_dir.path())
        };

        let mut out = Vec::new();
        let outcome = run(&config, &input, &mut out).unwrap();
        assert!(outcome.secondary.is_empty());
        assert!(config.estimator_path.exists());
    }

    #[test]
    fn test_banner_layout() {
        let mut out = Vec::new();
        banner(&mut out, "Basic Statistics").unwrap();
        let rule = "=".repeat(60);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("\n{}\nBasic Statistics\n{}\n\n", rule, rule)
        );
    }
}
