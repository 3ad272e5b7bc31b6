//! ## HyperLogLog estimator
//! Estimates number of distinct elements using `m = 2^p` registers.
//!
//! Every inserted element is hashed to a 32-bit value `h`:
//! - top `p` bits of `h` select the register index.
//! - remaining `32 - p` bits provide the rank, the 1-based position of their
//!   first set bit. A sentinel bit is set right after them, so rank is at most `33 - p`.
//!
//! Register keeps the maximum rank observed, so inserting the same element again
//! and merging estimators (pointwise maximum) are both idempotent.
//!
//! Estimate uses the original HyperLogLog bias corrections:
//! - linear counting while raw estimate is at most `2.5 * m` and some registers are 0.
//! - large range correction above `2^32 / 30` for 32-bit hash collisions.
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::mem::{size_of, size_of_val};

use thiserror::Error;
use tracing::{debug, trace};
use wyhash::WyHash;

use crate::precision::Precision;
use crate::registers::RegisterStore;

/// `2^32`, size of the hash space
const TWO_32: f64 = (1u64 << 32) as f64;

/// Error returned when merging estimators of different precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot merge HyperLogLog of {rhs} into HyperLogLog of {lhs}")]
pub struct MergeError {
    pub lhs: Precision,
    pub rhs: Precision,
}

/// HyperLogLog cardinality estimator.
///
/// `S` is the factory of hashers applied to inserted elements, by default it builds
/// [`WyHash`] hashers. Only the low 32 bits of the 64-bit hash are used.
#[derive(Clone)]
pub struct HyperLogLog<S = BuildHasherDefault<WyHash>> {
    precision: Precision,
    registers: RegisterStore,
    build_hasher: S,
}

impl HyperLogLog {
    /// Creates new `HyperLogLog` hashing elements with [`WyHash`]
    #[inline]
    pub fn new(precision: Precision) -> Self {
        Self::with_hasher(precision, BuildHasherDefault::default())
    }
}

impl<S: BuildHasher> HyperLogLog<S> {
    /// Creates new `HyperLogLog` hashing elements with hashers built by `build_hasher`
    pub fn with_hasher(precision: Precision, build_hasher: S) -> Self {
        debug!(%precision, registers = precision.registers(), "creating HyperLogLog");
        Self {
            precision,
            registers: RegisterStore::new(precision.registers()),
            build_hasher,
        }
    }

    /// Create `HyperLogLog` from already populated registers
    #[cfg(feature = "with_serde")]
    pub(crate) fn from_parts(
        precision: Precision,
        registers: RegisterStore,
        build_hasher: S,
    ) -> Self {
        debug_assert_eq!(registers.len(), precision.registers());
        Self {
            precision,
            registers,
            build_hasher,
        }
    }

    /// Return precision of `HyperLogLog`
    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Return number of registers
    #[inline]
    pub fn m(&self) -> usize {
        self.registers.len()
    }

    /// Return underlying registers
    #[inline]
    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    /// Return whether nothing was inserted into `HyperLogLog`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registers.zeros() == self.registers.len()
    }

    /// Insert a hashable item into `HyperLogLog`
    #[inline]
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut hasher = self.build_hasher.build_hasher();
        item.hash(&mut hasher);
        let hash = hasher.finish();
        self.insert_raw(hash as u32);
    }

    /// Insert precomputed 32-bit hash into `HyperLogLog`
    #[inline]
    pub fn insert_raw(&mut self, hash: u32) {
        let (idx, rank) = self.decode_hash(hash);
        self.registers.set_greater(idx, rank);
    }

    /// Return register index and rank of the hash
    #[inline]
    fn decode_hash(&self, hash: u32) -> (usize, u32) {
        let p = u32::from(self.precision.get());
        let idx = (hash >> (32 - p)) as usize;
        let rest = (hash << p) | (1 << (p - 1));
        (idx, rest.leading_zeros() + 1)
    }

    /// Merge `rhs` into `self`, so `self` estimates the union of both.
    ///
    /// # Panics
    ///
    /// Panics if estimators have different precision, see [`HyperLogLog::try_merge`].
    pub fn merge(&mut self, rhs: &Self) {
        if let Err(e) = self.try_merge(rhs) {
            panic!("{e}");
        }
    }

    /// Merge `rhs` into `self`, returning an error if estimators have different precision
    pub fn try_merge(&mut self, rhs: &Self) -> Result<(), MergeError> {
        if self.precision != rhs.precision {
            return Err(MergeError {
                lhs: self.precision,
                rhs: rhs.precision,
            });
        }
        self.registers.merge(&rhs.registers);
        debug!(
            precision = %self.precision,
            zeros = self.registers.zeros(),
            "merged HyperLogLog"
        );
        Ok(())
    }

    /// Reset `HyperLogLog` to empty state
    pub fn clear(&mut self) {
        self.registers.clear();
        debug!(precision = %self.precision, "cleared HyperLogLog");
    }

    /// Return cardinality estimate
    pub fn estimated_unique_count(&self) -> f64 {
        let m = self.m() as f64;
        let sum: f64 = self
            .registers
            .iter()
            .map(|rank| 1.0 / (1u64 << rank) as f64)
            .sum();
        let estimate = alpha(self.m()) * m * m / sum;

        let zeros = self.registers.zeros();
        if estimate <= 2.5 * m && zeros > 0 {
            trace!(estimate, zeros, "using linear counting");
            return linear_count(m, zeros as f64);
        }
        if estimate > TWO_32 / 30.0 {
            trace!(estimate, "using large range correction");
            return large_range_correction(estimate);
        }
        estimate
    }

    /// Return cardinality estimate rounded to the nearest integer
    #[inline]
    pub fn estimate(&self) -> usize {
        (self.estimated_unique_count() + 0.5) as usize
    }

    /// Return memory size of `HyperLogLog`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(self.registers.words())
    }
}

impl<S: BuildHasher + Default> Default for HyperLogLog<S> {
    fn default() -> Self {
        Self::with_hasher(Precision::DEFAULT, S::default())
    }
}

impl<S> PartialEq for HyperLogLog<S> {
    /// Compare precision and registers, ignoring hashers
    fn eq(&self, rhs: &Self) -> bool {
        self.precision == rhs.precision && self.registers == rhs.registers
    }
}

impl<S: BuildHasher> Debug for HyperLogLog<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {}, size: {} }}",
            self.precision.get(),
            self.estimate(),
            self.size_of()
        )
    }
}

impl<T: Hash, S: BuildHasher> Extend<T> for HyperLogLog<S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(&item);
        }
    }
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Linear counting estimate `m * ln(m / V)` for `V` zero registers
#[inline]
fn linear_count(m: f64, zeros: f64) -> f64 {
    m * (m / zeros).ln()
}

/// Correction for 32-bit hash collisions at very large cardinalities.
/// The hash space is saturated once estimate reaches `2^32`.
#[inline]
fn large_range_correction(estimate: f64) -> f64 {
    if estimate >= TWO_32 {
        return f64::INFINITY;
    }
    -TWO_32 * (1.0 - estimate / TWO_32).ln()
}
