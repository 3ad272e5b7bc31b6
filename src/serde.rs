//! # Serde module for HyperLogLog
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `HyperLogLog`. It uses `serde`'s custom serialization and deserialization mechanisms.
//!
//! `HyperLogLog` is serialized as a tuple `(precision, words)`, where `words` are the packed
//! register words as returned by [`RegisterStore::words`]. The hasher is not serialized,
//! deserialized estimator uses `S::default()`, so it must be the same hasher that produced the registers.
//!
//! During deserialization precision range and words length are validated, bits outside of
//! register slots are rejected and the number of zero registers is recomputed.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use std::hash::BuildHasher;

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::hyperloglog::HyperLogLog;
use crate::precision::Precision;
use crate::registers::RegisterStore;

impl<S: BuildHasher> Serialize for HyperLogLog<S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.precision().get())?;
        tup.serialize_element(self.registers().words())?;
        tup.end()
    }
}

impl<'de, S: BuildHasher + Default> Deserialize<'de> for HyperLogLog<S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (precision, words): (u8, Vec<u32>) = Deserialize::deserialize(deserializer)?;
        let precision = Precision::try_new(precision).map_err(D::Error::custom)?;
        let registers =
            RegisterStore::from_words(precision.registers(), words).map_err(D::Error::custom)?;
        Ok(HyperLogLog::from_parts(precision, registers, S::default()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(4, 0; "empty set")]
    #[test_case(4, 1; "single element")]
    #[test_case(10, 100; "hundred distinct elements")]
    #[test_case(16, 10000; "ten thousand distinct elements")]
    fn test_serde(p: u8, n: usize) {
        let mut original = HyperLogLog::new(Precision::new(p));
        for i in 0..n {
            original.insert(&format!("item{}", i));
        }

        let serialized = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: HyperLogLog =
            serde_json::from_str(&serialized).expect("deserialization failed");

        assert_eq!(original, deserialized);
        assert_eq!(original.registers().zeros(), deserialized.registers().zeros());
        assert_eq!(original.estimate(), deserialized.estimate());
    }

    #[test]
    fn test_serialized_format() {
        let mut hll = HyperLogLog::new(Precision::new(4));
        hll.insert_raw(0);
        assert_eq!(serde_json::to_string(&hll).unwrap(), "[4,[29,0,0]]");
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let result: Result<HyperLogLog, _> = serde_json::from_str("{ invalid_json_string }");
        assert!(result.is_err());
    }

    #[test_case("[3,[0,0,0]]"; "precision too low")]
    #[test_case("[17,[]]"; "precision too high")]
    #[test_case("[4,[0,0]]"; "too few words")]
    #[test_case("[4,[0,0,0,0]]"; "too many words")]
    #[test_case("[4,[1073741824,0,0]]"; "bits outside of registers")]
    #[test_case("[4,[0,0,1048576]]"; "bits past last register")]
    #[test_case("[4,null]"; "missing words")]
    fn test_failed_deserialization(input: &str) {
        let result: Result<HyperLogLog, _> = serde_json::from_str(input);
        assert!(result.is_err());
    }
}
