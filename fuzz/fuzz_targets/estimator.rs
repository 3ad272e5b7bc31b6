#![no_main]

use libfuzzer_sys::fuzz_target;
use packed_hll::{HyperLogLog, Precision};
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let precision = Precision::new(4 + data[0] % 13);
    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = HyperLogLog::new(precision);
    for chunk in first_half.chunks(4) {
        estimator1.insert(chunk);
        assert!(estimator1.estimated_unique_count() > 0.0);
    }

    let mut estimator2 = HyperLogLog::new(precision);
    for chunk in second_half.chunks(4) {
        let mut raw = [0u8; 4];
        raw[..chunk.len()].copy_from_slice(chunk);
        estimator2.insert_raw(u32::from_le_bytes(raw));
    }

    let before: Vec<u32> = estimator1.registers().iter().collect();
    estimator1.merge(&estimator2);
    let merged = estimator1.registers().iter();
    for ((old, new), other) in before.iter().zip(merged).zip(estimator2.registers().iter()) {
        assert_eq!(new, (*old).max(other));
    }

    let registers = estimator1.registers();
    assert_eq!(
        registers.zeros(),
        registers.iter().filter(|&v| v == 0).count()
    );
});
