//! ## Precision
//! Number of hash bits used to select a HyperLogLog register.
//!
//! Precision `p` must be in `[4..16]` range and defines `m = 2^p` registers.
//! Expected standard error of the estimate is `1.04 / sqrt(m)`:
//! - p = 4:  1.04 / sqrt(2^4)  = 26.00%
//! - p = 10: 1.04 / sqrt(2^10) = 3.25%
//! - p = 14: 1.04 / sqrt(2^14) = 0.81%
//! - p = 16: 1.04 / sqrt(2^16) = 0.41%

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Error returned when constructing [`Precision`] from out of range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("precision must be in [4..16] range, got {got}")]
pub struct PrecisionError {
    /// Rejected precision value.
    pub got: u8,
}

/// HyperLogLog precision in `[4..16]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(u8);

impl Precision {
    /// Lowest supported precision (16 registers)
    pub const LOWEST: Self = Self(4);
    /// Default precision (4096 registers)
    pub const DEFAULT: Self = Self(12);
    /// Highest supported precision (65536 registers)
    pub const HIGHEST: Self = Self(16);

    /// Creates new `Precision`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside of `[4..16]` range. Out of range precision is a
    /// configuration error, use [`Precision::try_new`] to handle it instead.
    #[inline]
    pub fn new(p: u8) -> Self {
        match Self::try_new(p) {
            Ok(precision) => precision,
            Err(e) => panic!("invalid HyperLogLog configuration: {e}"),
        }
    }

    /// Creates new `Precision`, returning an error if `p` is outside of `[4..16]` range.
    #[inline]
    pub const fn try_new(p: u8) -> Result<Self, PrecisionError> {
        if p < Self::LOWEST.0 || p > Self::HIGHEST.0 {
            return Err(PrecisionError { got: p });
        }
        Ok(Self(p))
    }

    /// Return raw precision value
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Return number of registers `m = 2^p`
    #[inline]
    pub const fn registers(self) -> usize {
        1 << self.0
    }

    /// Return expected standard error of the estimate
    pub fn standard_error(self) -> f64 {
        1.04 / (self.registers() as f64).sqrt()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Precision {
    type Error = PrecisionError;

    fn try_from(p: u8) -> Result<Self, Self::Error> {
        Self::try_new(p)
    }
}

impl From<Precision> for u8 {
    fn from(precision: Precision) -> Self {
        precision.0
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Precision({})", self.0)
    }
}
