//! TypeScript estimator generation
//!
//! Renders a fitted TotalGas model as a standalone `estimateJobGas`
//! function so applications can estimate job cost without this tool.

use crate::dataset::Operation;
use crate::features::Feature;
use crate::regression::LinearModel;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Coefficients of the estimator, as they appear in the generated code
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorCode {
    pub intercept: f64,
    pub rows: f64,
    pub columns: f64,
    /// Present only when the model was fitted with Rows_x_Columns
    pub interaction: Option<f64>,
    pub filter_bytes: f64,
    /// Additive offset per operation, COUNT fixed at 0
    pub operation_costs: [(Operation, f64); 6],
}

impl EstimatorCode {
    /// Extract estimator coefficients; absent features count as 0
    pub fn from_model(model: &LinearModel) -> Self {
        let coefficient = |feature| model.coefficient(feature).unwrap_or(0.0);

        let operation_costs = Operation::ALL.map(|op| {
            let cost = if op == Operation::REFERENCE {
                0.0
            } else {
                coefficient(Feature::Operation(op))
            };
            (op, cost)
        });

        Self {
            intercept: model.intercept(),
            rows: coefficient(Feature::Rows),
            columns: coefficient(Feature::Columns),
            interaction: model.coefficient(Feature::RowsTimesColumns),
            filter_bytes: coefficient(Feature::FilterBytes),
            operation_costs,
        }
    }

    /// Generated TypeScript source
    pub fn render(&self) -> String {
        let mut code = String::from("\n");

        code.push_str("/**\n");
        code.push_str(" * Estimates gas cost for a JobManager job based on parameters\n");
        code.push_str(" * \n");
        code.push_str(" * Model Accuracy: See analysis output for R² and MAPE\n");
        if self.interaction.is_some() {
            code.push_str(" * Model includes Rows × Columns interaction term for better accuracy\n");
        }
        code.push_str(" * \n");
        code.push_str(" * @param rows Number of rows in dataset\n");
        code.push_str(" * @param columns Number of columns in dataset\n");
        code.push_str(" * @param operation Operation type\n");
        code.push_str(" * @param filterBytes Approximate filter bytecode length\n");
        code.push_str(" * @returns Estimated total gas cost\n");
        code.push_str(" */\n");

        code.push_str("function estimateJobGas(\n");
        code.push_str("  rows: number,\n");
        code.push_str("  columns: number,\n");
        let _ = writeln!(code, "  operation: {},", operation_union());
        code.push_str("  filterBytes: number\n");
        code.push_str("): number {\n");

        code.push_str("  // Base cost (intercept)\n");
        let _ = writeln!(code, "  let gas = {:.0};", self.intercept);
        code.push_str("  \n");
        code.push_str("  // Add per-row cost\n");
        let _ = writeln!(code, "  gas += rows * {:.0};", self.rows);
        code.push_str("  \n");

        match self.interaction {
            Some(interaction) => {
                code.push_str("  // Add per-column cost\n");
                let _ = writeln!(code, "  gas += columns * {:.0};", self.columns);
                code.push_str("  \n");
                code.push_str("  // Add row × column interaction (decoding cost scales with both)\n");
                let _ = writeln!(code, "  gas += (rows * columns) * {:.0};", interaction);
            }
            None => {
                code.push_str("  // Add per-column cost (decoding)\n");
                let _ = writeln!(code, "  gas += columns * {:.0};", self.columns);
            }
        }
        code.push_str("  \n");

        code.push_str("  // Add filter complexity cost\n");
        let _ = writeln!(code, "  gas += filterBytes * {:.0};", self.filter_bytes);
        code.push_str("  \n");

        code.push_str("  // Add operation-specific costs (relative to COUNT baseline)\n");
        code.push_str("  const operationCosts = {\n");
        for (op, cost) in &self.operation_costs {
            if *op == Operation::REFERENCE {
                let _ = writeln!(code, "    '{}': 0,  // baseline", op.label());
            } else {
                let _ = writeln!(code, "    '{}': {:.0},", op.label(), cost);
            }
        }
        code.push_str("  };\n");
        code.push_str("  \n");
        code.push_str("  gas += operationCosts[operation];\n");
        code.push_str("  \n");
        code.push_str("  return Math.round(gas);\n");
        code.push_str("}\n");

        code.push('\n');
        code.push_str("// Example usage:\n");
        code.push_str("const estimatedGas = estimateJobGas(50, 15, 'SUM', 7);\n");
        code.push_str("console.log(`Estimated gas: ${estimatedGas.toLocaleString()}`);\n");

        code
    }

    /// Write the rendered code to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write estimator to {}", path.display()))?;
        tracing::info!("Wrote estimator to {}", path.display());
        Ok(())
    }
}

/// `'COUNT' | 'SUM' | ...` in declaration order
fn operation_union() -> String {
    Operation::ALL
        .iter()
        .map(|op| format!("'{}'", op.label()))
        .collect::<Vec<_>>()
        .join(" | ")
}
