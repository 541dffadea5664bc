// Integration tests for the gasfit command line
//
// Every run happens inside a fresh temp directory so the default output
// paths (gas_analysis.png, estimateJobGas.ts) land there.

use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/gas_benchmark_results.csv")
}

const HEADER: &str =
    "Operation,FilterComplexity,Rows,Columns,OpenJobGas,PushRowTotal,PushRowAvg,FinalizeGas,TotalGas";

// ============================================================================
// Usage and input errors
// ============================================================================

#[test]
fn test_missing_argument_prints_usage() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path());

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: gasfit"));
}

#[test]
fn test_unknown_flag_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg("--bogus").arg(fixture());

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"));

    assert!(!temp_dir.path().join("estimateJobGas.ts").exists());
}

#[test]
fn test_nonexistent_file_creates_no_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg("missing.csv");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("File 'missing.csv' not found"));

    assert!(!temp_dir.path().join("gas_analysis.png").exists());
    assert!(!temp_dir.path().join("estimateJobGas.ts").exists());
}

#[test]
fn test_nonexistent_file_leaves_existing_outputs_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let estimator = temp_dir.path().join("estimateJobGas.ts");
    fs::write(&estimator, "previous").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg("missing.csv");
    cmd.assert().code(1);

    assert_eq!(fs::read_to_string(&estimator).unwrap(), "previous");
}

#[test]
fn test_unknown_operation_rejected_with_line() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bad.csv");
    fs::write(
        &input,
        format!("{HEADER}\nCOUNT,none,5,2,1,1,1,1,4\nMEDIAN,none,5,2,1,1,1,1,4\n"),
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg(&input);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Line 3: unknown Operation label 'MEDIAN'"));
    assert!(!temp_dir.path().join("estimateJobGas.ts").exists());
}

#[test]
fn test_missing_column_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("short.csv");
    fs::write(&input, "Operation,FilterComplexity,Rows\nCOUNT,none,5\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg(&input);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required column 'Columns'"));
}

// ============================================================================
// Successful analysis
// ============================================================================

#[test]
fn test_full_analysis_writes_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg(fixture());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 48 test cases"))
        .stdout(predicate::str::contains("Total Gas by Operation:"))
        .stdout(predicate::str::contains("Relative to COUNT (1.0x):"))
        .stdout(predicate::str::contains("(with Rows × Columns interaction)"))
        .stdout(predicate::str::contains("R² Score:"))
        .stdout(predicate::str::contains("--- Analyzing PushRowTotal Costs ---"))
        .stdout(predicate::str::contains("function estimateJobGas("))
        .stdout(predicate::str::contains("Analysis Complete!"));

    let png = fs::read(temp_dir.path().join("gas_analysis.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let code = fs::read_to_string(temp_dir.path().join("estimateJobGas.ts")).unwrap();
    assert!(code.contains("gas += (rows * columns) * "));
    assert!(code.contains("    'COUNT': 0,  // baseline"));
    assert!(code.contains("return Math.round(gas);"));
}

#[test]
fn test_no_interaction_flag() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path())
        .arg("--no-interaction")
        .arg(fixture());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(with Rows × Columns interaction)").not());

    let code = fs::read_to_string(temp_dir.path().join("estimateJobGas.ts")).unwrap();
    assert!(!code.contains("rows * columns"));
    assert!(code.contains("// Add per-column cost (decoding)"));
}

#[test]
fn test_generated_code_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let estimator = temp_dir.path().join("estimateJobGas.ts");

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
        cmd.current_dir(temp_dir.path()).arg(fixture());
        cmd.assert().success();
        runs.push(fs::read_to_string(&estimator).unwrap());
    }

    assert_eq!(runs[0], runs[1]);
}

#[test]
fn test_output_path_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path())
        .arg("--plot")
        .arg("out/diagnostics.svg")
        .arg("--estimator")
        .arg("out/estimate.ts")
        .arg(fixture());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Saved visualization to: out/diagnostics.svg"));

    let svg = fs::read_to_string(temp_dir.path().join("out/diagnostics.svg")).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Actual vs Predicted Total Gas"));
    assert!(temp_dir.path().join("out/estimate.ts").exists());
    assert!(!temp_dir.path().join("gas_analysis.png").exists());
}

#[test]
fn test_config_file_thresholds_are_advisory() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("gasfit.toml");
    fs::write(
        &config,
        "secondary_targets = []\n\n[thresholds]\nmin_r2 = 1.0\nmax_mape = 0.0\n",
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path())
        .arg("--config")
        .arg(&config)
        .arg(fixture());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("✗ Model above MAPE target"))
        .stdout(predicate::str::contains("Analyzing PushRowTotal").not());
    assert!(temp_dir.path().join("estimateJobGas.ts").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("gasfit.toml");
    fs::write(&config, "plot_widht = 10\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path())
        .arg("--config")
        .arg(&config)
        .arg(fixture());

    cmd.assert().code(1);
    assert!(!temp_dir.path().join("gas_analysis.png").exists());
}

#[test]
fn test_debug_flag_logs_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gasfit");
    cmd.current_dir(temp_dir.path()).arg("--debug").arg(fixture());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Loaded 48 records"));
}
