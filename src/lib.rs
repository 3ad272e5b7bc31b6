//! `packed-hll` is a Rust crate designed to estimate the number of distinct elements in a stream or dataset.
//!
//! This library uses the original HyperLogLog algorithm with 5-bit registers packed six per `u32` word,
//! and pluggable hashing through [`std::hash::BuildHasher`].
//!
//! ```
//! use packed_hll::{HyperLogLog, Precision};
//!
//! let mut hll = HyperLogLog::new(Precision::HIGHEST);
//! for item in ["a", "b", "c", "a"] {
//!     hll.insert(item);
//! }
//! assert_eq!(hll.estimate(), 3);
//! ```
pub mod hyperloglog;
pub mod precision;
pub mod registers;
#[cfg(feature = "with_serde")]
mod serde;

pub use hyperloglog::{HyperLogLog, MergeError};
pub use precision::{Precision, PrecisionError};
pub use registers::{RegisterError, RegisterStore};
