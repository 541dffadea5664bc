// Fit quality thresholds
//
// Advisory only: a model below target is still written out.

use serde::{Deserialize, Serialize};

/// Thresholds a fitted cost model is checked against
///
/// # Example
/// ```
/// use gasfit::regression::FitThresholds;
///
/// let thresholds = FitThresholds::default();
/// assert_eq!(thresholds.min_r2, 0.60);
/// assert_eq!(thresholds.max_mape, 40.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitThresholds {
    /// Minimum fraction of target variance the model must explain
    pub min_r2: f64,

    /// Maximum mean absolute percentage error, in percent
    pub max_mape: f64,
}

impl Default for FitThresholds {
    fn default() -> Self {
        Self {
            min_r2: 0.60,
            max_mape: 40.0,
        }
    }
}

impl FitThresholds {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_r2) {
            return Err(format!("min_r2 must be in [0, 1], got {}", self.min_r2));
        }

        if !(self.max_mape >= 0.0) || self.max_mape.is_infinite() {
            return Err(format!(
                "max_mape must be a non-negative percentage, got {}",
                self.max_mape
            ));
        }

        Ok(())
    }
}
