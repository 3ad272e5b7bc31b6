//! ## Register store
//! Fixed number of HyperLogLog registers packed into `u32` words.
//!
//! Every register is `REGISTER_WIDTH` (5) bits wide, which is enough to hold the
//! longest possible run length of a 32-bit hash. Registers never straddle word
//! boundaries, so every `u32` holds `REGISTERS_PER_WORD` (6) registers and its top
//! 2 bits are always zero:
//!
//! ```text
//!   Mask:                                  11111
//! Word 0: 00 00000 00000 00000 00000 00000 00000
//!                5     4     3     2     1     0
//! Word 1: 00 00000 00000 00000 00000 00000 00000
//!               11    10     9     8     7     6
//! ```
//!
//! Registers are only ever increased (see [`RegisterStore::set_greater`]), and the
//! number of zero registers is maintained on every write instead of being recounted.

use std::mem::{size_of, size_of_val};

use thiserror::Error;

/// Number of bits used by a single register
pub const REGISTER_WIDTH: usize = 5;
/// Number of registers stored in a single `u32` word
pub const REGISTERS_PER_WORD: usize = u32::BITS as usize / REGISTER_WIDTH;
/// Largest value representable by a single register
pub const MAX_VALUE: u32 = (1 << REGISTER_WIDTH) - 1;
/// Mask of bits occupied by registers within a single `u32` word
const WORD_MASK: u32 = (1 << (REGISTERS_PER_WORD * REGISTER_WIDTH)) - 1;

/// Error returned when restoring [`RegisterStore`] from raw words
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register store must hold at least one register")]
    Empty,
    #[error("expected {expected} words for {count} registers, got {got}")]
    InvalidLength {
        count: usize,
        expected: usize,
        got: usize,
    },
    #[error("word {word} has bits set outside of register slots")]
    InvalidWord { word: usize },
}

/// Bit-packed array of 5-bit HyperLogLog registers
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterStore {
    /// Packed register values
    words: Vec<u32>,
    /// Number of registers
    count: usize,
    /// Number of registers currently set to 0
    zeros: usize,
}

impl RegisterStore {
    /// Creates new `RegisterStore` with `count` registers set to 0.
    ///
    /// # Panics
    ///
    /// Panics if `count` is 0.
    pub fn new(count: usize) -> Self {
        assert!(count > 0, "register store must hold at least one register");
        Self {
            words: vec![0; count.div_ceil(REGISTERS_PER_WORD)],
            count,
            zeros: count,
        }
    }

    /// Restores `RegisterStore` of `count` registers from packed `words`
    /// previously obtained from [`RegisterStore::words`].
    pub fn from_words(count: usize, words: Vec<u32>) -> Result<Self, RegisterError> {
        if count == 0 {
            return Err(RegisterError::Empty);
        }
        let expected = count.div_ceil(REGISTERS_PER_WORD);
        if words.len() != expected {
            return Err(RegisterError::InvalidLength {
                count,
                expected,
                got: words.len(),
            });
        }
        // Last word may be partially occupied
        let used_in_last = count - (expected - 1) * REGISTERS_PER_WORD;
        let last_mask = WORD_MASK >> ((REGISTERS_PER_WORD - used_in_last) * REGISTER_WIDTH);
        for (word, &bits) in words.iter().enumerate() {
            let mask = if word + 1 == expected { last_mask } else { WORD_MASK };
            if bits & !mask != 0 {
                return Err(RegisterError::InvalidWord { word });
            }
        }

        let mut store = Self {
            words,
            count,
            zeros: 0,
        };
        store.zeros = store.iter().filter(|&v| v == 0).count();
        Ok(store)
    }

    /// Return number of registers
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false, `RegisterStore` holds at least one register
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Return number of registers set to 0
    #[inline]
    pub fn zeros(&self) -> usize {
        self.zeros
    }

    /// Return `idx` register value.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn get(&self, idx: usize) -> u32 {
        assert!(
            idx < self.count,
            "register index {idx} out of bounds for {} registers",
            self.count
        );
        let (word, shift) = locate(idx);
        (self.words[word] >> shift) & MAX_VALUE
    }

    /// Set `idx` register to `value` if `value` is greater than the current one.
    /// Returns whether the register was updated.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds or `value` does not fit into a register.
    #[inline]
    pub fn set_greater(&mut self, idx: usize, value: u32) -> bool {
        assert!(
            idx < self.count,
            "register index {idx} out of bounds for {} registers",
            self.count
        );
        assert!(
            value <= MAX_VALUE,
            "register value {value} exceeds {MAX_VALUE}"
        );
        let (word, shift) = locate(idx);
        let bits = &mut self.words[word];
        let current = (*bits >> shift) & MAX_VALUE;
        if value <= current {
            return false;
        }

        *bits = (*bits & !(MAX_VALUE << shift)) | (value << shift);
        if current == 0 {
            self.zeros -= 1;
        }
        true
    }

    /// Raise every register to the maximum of its own and `rhs` value.
    ///
    /// # Panics
    ///
    /// Panics if stores have different number of registers.
    pub fn merge(&mut self, rhs: &RegisterStore) {
        assert_eq!(
            self.count, rhs.count,
            "cannot merge register stores of different length"
        );
        for (idx, value) in rhs.iter().enumerate() {
            self.set_greater(idx, value);
        }
    }

    /// Reset all registers to 0
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.zeros = self.count;
    }

    /// Return iterator over register values in index order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words
            .iter()
            .flat_map(|&bits| {
                (0..REGISTERS_PER_WORD).map(move |i| (bits >> (i * REGISTER_WIDTH)) & MAX_VALUE)
            })
            .take(self.count)
    }

    /// Return packed register words
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Return memory size of `RegisterStore`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(self.words.as_slice())
    }
}

impl std::fmt::Debug for RegisterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterStore")
            .field("len", &self.count)
            .field("zeros", &self.zeros)
            .finish()
    }
}

/// Return word index and bit offset of `idx` register
#[inline]
fn locate(idx: usize) -> (usize, usize) {
    (
        idx / REGISTERS_PER_WORD,
        (idx % REGISTERS_PER_WORD) * REGISTER_WIDTH,
    )
}
