//! Analysis configuration
//!
//! Every field has a default, so an empty file (or no file at all) runs the
//! standard analysis. Example `gasfit.toml`:
//!
//! ```toml
//! include_interaction = true
//! secondary_targets = ["PushRowTotal"]
//! plot_path = "gas_analysis.png"
//! estimator_path = "estimateJobGas.ts"
//!
//! [thresholds]
//! min_r2 = 0.60
//! max_mape = 40.0
//! ```

use crate::features::Target;
use crate::regression::FitThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Fit the Rows × Columns interaction term
    pub include_interaction: bool,

    /// Extra targets fitted and reported after TotalGas
    pub secondary_targets: Vec<Target>,

    /// Advisory fit quality thresholds
    pub thresholds: FitThresholds,

    /// Diagnostic image; `.svg` selects vector output
    pub plot_path: PathBuf,

    /// Generated TypeScript estimator
    pub estimator_path: PathBuf,

    pub plot_width: u32,
    pub plot_height: u32,

    /// Rows shown in the data preview
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_interaction: true,
            secondary_targets: vec![Target::PushRowTotal],
            thresholds: FitThresholds::default(),
            plot_path: PathBuf::from("gas_analysis.png"),
            estimator_path: PathBuf::from("estimateJobGas.ts"),
            plot_width: 1500,
            plot_height: 1200,
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gasfit::config::AnalysisConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_file("gasfit.toml")?;
    /// println!("Plot goes to {}", config.plot_path.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.thresholds.validate()?;

        if self.secondary_targets.contains(&Target::TotalGas) {
            return Err("secondary_targets must not repeat the primary target TotalGas".to_string());
        }

        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(format!(
                "plot size must be non-zero, got {}x{}",
                self.plot_width, self.plot_height
            ));
        }

        if self.plot_path.as_os_str().is_empty() || self.estimator_path.as_os_str().is_empty() {
            return Err("output paths must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert!(config.include_interaction);
        assert_eq!(config.secondary_targets, vec![Target::PushRowTotal]);
        assert_eq!(config.plot_path, PathBuf::from("gas_analysis.png"));
        assert_eq!(config.estimator_path, PathBuf::from("estimateJobGas.ts"));
        assert_eq!(config.preview_rows, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
include_interaction = false
secondary_targets = []
plot_path = "out/diagnostics.svg"
estimator_path = "out/estimator.ts"
plot_width = 800
plot_height = 600
preview_rows = 3

[thresholds]
min_r2 = 0.9
max_mape = 10.0
"#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert!(!config.include_interaction);
        assert!(config.secondary_targets.is_empty());
        assert_eq!(config.plot_path, PathBuf::from("out/diagnostics.svg"));
        assert_eq!(config.plot_width, 800);
        assert_eq!(config.thresholds.min_r2, 0.9);
        assert_eq!(config.thresholds.max_mape, 10.0);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(AnalysisConfig::from_toml_str("include_interation = false").is_err());
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let err = AnalysisConfig::from_toml_str("[thresholds]\nmin_r2 = 2.0").unwrap_err();
        assert!(err.to_string().contains("min_r2"));
    }

    #[test]
    fn test_primary_target_not_secondary() {
        let config = AnalysisConfig {
            secondary_targets: vec![Target::TotalGas],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_plot_size_rejected() {
        let config = AnalysisConfig {
            plot_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(AnalysisConfig::from_file("/nonexistent/gasfit.toml").is_err());
    }
}
