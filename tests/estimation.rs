use std::hash::{BuildHasherDefault, Hasher};

use packed_hll::{HyperLogLog, Precision};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_case::test_case;

#[test]
fn test_small_cardinality() {
    let mut hll = HyperLogLog::new(Precision::new(10));
    for item in ["a", "b", "c", "d", "e", "f"] {
        hll.insert(item);
    }
    assert_eq!(hll.estimated_unique_count().round(), 6.0);
}

#[test]
fn test_small_cardinality_with_repeats() {
    let mut hll = HyperLogLog::new(Precision::new(10));
    hll.insert("a");
    for _ in 0..8 {
        hll.insert("b");
    }
    for item in ["c", "d", "e", "f", "f", "a"] {
        hll.insert(item);
    }
    assert_eq!(hll.estimated_unique_count().round(), 6.0);
}

#[test]
fn test_many() {
    let real_count: u32 = 1_000_000;
    let mut hll = HyperLogLog::new(Precision::HIGHEST);
    for i in 0..real_count {
        hll.insert(&i);
    }

    let estimated = hll.estimated_unique_count();
    let relative_error = (estimated - f64::from(real_count)).abs() / f64::from(real_count);
    assert!(relative_error < 0.01, "relative error {relative_error}");
}

#[test]
fn test_merge_deduplicates() {
    let mut hll1 = HyperLogLog::new(Precision::HIGHEST);
    let mut hll2 = HyperLogLog::new(Precision::HIGHEST);

    for i in [1u32, 2, 3, 3, 3, 3] {
        hll1.insert(&i);
    }
    assert!((hll1.estimated_unique_count() - 3.0).abs() < 0.01);

    for i in [3u32, 4, 5, 6, 7] {
        hll2.insert(&i);
    }
    assert!((hll2.estimated_unique_count() - 5.0).abs() < 0.01);

    hll1.merge(&hll2);
    assert!((hll1.estimated_unique_count() - 7.0).abs() < 0.01);
}

#[test]
fn test_reinsertion_is_idempotent() {
    let mut hll = HyperLogLog::new(Precision::new(12));
    for i in 0..5000u64 {
        hll.insert(&i);
    }
    let registers = hll.registers().clone();
    let estimate = hll.estimated_unique_count();

    for i in (0..5000u64).rev() {
        hll.insert(&i);
    }
    assert_eq!(hll.registers(), &registers);
    assert_eq!(hll.estimated_unique_count(), estimate);
}

/// Relative error must stay within 5 standard errors for random input
#[test_case(4, 1_000)]
#[test_case(8, 10_000)]
#[test_case(10, 100)]
#[test_case(10, 100_000)]
#[test_case(12, 1_000)]
#[test_case(12, 500_000)]
#[test_case(14, 50_000)]
#[test_case(16, 200_000)]
fn test_relative_error(p: u8, n: usize) {
    let precision = Precision::new(p);
    let mut rng = StdRng::seed_from_u64(12345);
    let mut hll = HyperLogLog::new(precision);
    for _ in 0..n {
        hll.insert(&rng.gen::<u64>());
    }

    let relative_error = (hll.estimated_unique_count() - n as f64).abs() / n as f64;
    assert!(
        relative_error < 5.0 * precision.standard_error(),
        "p = {p}, n = {n}, relative error {relative_error}"
    );
}

/// FNV-1a hasher with murmur3 `fmix64` finalizer
struct FnvMixHasher(u64);

impl Default for FnvMixHasher {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for FnvMixHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn finish(&self) -> u64 {
        let mut h = self.0;
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^ (h >> 33)
    }
}

#[test]
fn test_custom_hasher() {
    let mut hll = HyperLogLog::with_hasher(
        Precision::new(14),
        BuildHasherDefault::<FnvMixHasher>::default(),
    );
    for i in 0..20_000u32 {
        hll.insert(&i);
    }
    let relative_error = (hll.estimated_unique_count() - 20_000.0).abs() / 20_000.0;
    assert!(relative_error < 0.05, "relative error {relative_error}");
}

/// Hasher returning the same hash for every element
#[derive(Default)]
struct ConstHasher;

impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}

    fn finish(&self) -> u64 {
        0xdead_beef_0400_0000
    }
}

#[test]
fn test_insert_uses_low_32_bits() {
    let mut hll = HyperLogLog::with_hasher(
        Precision::LOWEST,
        BuildHasherDefault::<ConstHasher>::default(),
    );
    hll.insert("anything");
    hll.insert(&42u8);

    let mut raw = HyperLogLog::with_hasher(
        Precision::LOWEST,
        BuildHasherDefault::<ConstHasher>::default(),
    );
    raw.insert_raw(0x0400_0000);

    assert_eq!(hll, raw);
    assert_eq!(hll.registers().get(0), 2);
    assert_eq!(hll.registers().zeros(), 15);
}

#[test]
fn test_default() {
    let mut hll: HyperLogLog = HyperLogLog::default();
    assert_eq!(hll.precision(), Precision::DEFAULT);
    assert_eq!(hll.m(), 4096);
    hll.insert("item");
    assert_eq!(hll.estimate(), 1);
}
