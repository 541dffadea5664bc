//! CLI argument parsing for gasfit

use crate::config::AnalysisConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Usage line printed when no input file is given
pub const USAGE: &str = "Usage: gasfit [OPTIONS] <CSV_FILE>";

#[derive(Parser, Debug)]
#[command(name = "gasfit")]
#[command(version)]
#[command(
    about = "Fit a linear gas cost model to benchmark results and generate a TypeScript estimator",
    long_about = None
)]
pub struct Cli {
    /// Benchmark results CSV (e.g., gas_benchmark_results.csv)
    #[arg(value_name = "CSV_FILE")]
    pub input: Option<PathBuf>,

    /// Load analysis settings from a TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnostic image path (default: gas_analysis.png; .svg selects vector output)
    #[arg(long = "plot", value_name = "PATH")]
    pub plot: Option<PathBuf>,

    /// Generated estimator path (default: estimateJobGas.ts)
    #[arg(long = "estimator", value_name = "PATH")]
    pub estimator: Option<PathBuf>,

    /// Fit without the Rows × Columns interaction term
    #[arg(long = "no-interaction")]
    pub no_interaction: bool,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

/// Exit status for a rejected command line: 0 for `--help`/`--version`, 1 otherwise
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

impl Cli {
    /// Configuration from `--config` (or defaults) with command-line overrides applied
    pub fn to_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(plot) = &self.plot {
            config.plot_path = plot.clone();
        }
        if let Some(estimator) = &self.estimator {
            config.estimator_path = estimator.clone();
        }
        if self.no_interaction {
            config.include_interaction = false;
        }

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}
