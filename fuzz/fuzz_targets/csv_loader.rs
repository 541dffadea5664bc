#![no_main]

use libfuzzer_sys::fuzz_target;
use gasfit::dataset::GasTable;
use gasfit::features::{FeatureSet, Target};
use gasfit::regression::{fit, FitThresholds};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must load or fail with an error, never panic
    if let Ok(table) = GasTable::from_reader(data) {
        let _ = fit(
            &table,
            Target::TotalGas,
            &FeatureSet::new(true),
            &FitThresholds::default(),
        );
    }
});
