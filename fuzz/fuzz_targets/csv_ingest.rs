#![no_main]

use libfuzzer_sys::fuzz_target;
use parscale::aggregate::Aggregator;
use parscale::ingest::parse_trials;
use parscale::record::ExecutionMode;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a results table: ingestion either errors or yields
    // trials the aggregator accepts, never a panic
    for mode in ExecutionMode::ALL {
        if let Ok(loaded) = parse_trials(data, mode, "fuzz") {
            let table = Aggregator::default().aggregate(&loaded.trials);
            assert!(table.len() <= loaded.trials.len());
        }
    }
});
