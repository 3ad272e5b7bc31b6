#![no_main]

use libfuzzer_sys::fuzz_target;
use packed_hll::HyperLogLog;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = serde_json::from_slice::<HyperLogLog>(data) {
        estimator.insert(&1);
        assert!(estimator.estimated_unique_count() > 0.0);
    }
});
