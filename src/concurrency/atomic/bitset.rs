//! Word-packed atomic bitsets.
//!
//! This is a dense alternative to `Vec<AtomicBool>` for vote bits and message flags.

use core::sync::atomic::{AtomicUsize, Ordering};

/// A word-packed atomic bitset with a fixed number of bits.
pub struct AtomicBitSet {
    bits: usize,
    words: Box<[AtomicUsize]>,
}

impl AtomicBitSet {
    /// Creates a new bitset with `bits` bits, all cleared.
    pub fn new(bits: usize) -> Self {
        let word_bits = usize::BITS as usize;
        let words_len = bits.div_ceil(word_bits);
        let words = (0..words_len).map(|_| AtomicUsize::new(0)).collect();
        Self { bits, words }
    }

    /// Number of bits.
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// Size in bytes of a bitset holding `bits` bits.
    pub fn memory_estimation(bits: usize) -> usize {
        core::mem::size_of::<Self>() + bits.div_ceil(usize::BITS as usize) * core::mem::size_of::<usize>()
    }

    /// Clears all bits.
    pub fn clear_all(&self) {
        for w in self.words.iter() {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        assert!(bit < self.bits, "bit {bit} out of bounds for {} bits", self.bits);
        let (word, mask) = bit_word_mask(bit);
        (self.words[word].load(Ordering::Relaxed) & mask) != 0
    }

    /// Sets `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn set(&self, bit: usize) {
        self.test_and_set(bit);
    }

    /// Sets `bit` and returns `true` iff this call observed it previously cleared.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn test_and_set(&self, bit: usize) -> bool {
        assert!(bit < self.bits, "bit {bit} out of bounds for {} bits", self.bits);
        let (word, mask) = bit_word_mask(bit);
        let prev = self.words[word].fetch_or(mask, Ordering::AcqRel);
        (prev & mask) == 0
    }

    /// Clears `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn clear(&self, bit: usize) {
        assert!(bit < self.bits, "bit {bit} out of bounds for {} bits", self.bits);
        let (word, mask) = bit_word_mask(bit);
        self.words[word].fetch_and(!mask, Ordering::AcqRel);
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Returns `true` iff every bit in `0..len_bits()` is set.
    ///
    /// An empty bitset is trivially all set.
    pub fn all_set(&self) -> bool {
        let Some((last, full)) = self.words.split_last() else {
            return true;
        };
        if full.iter().any(|w| w.load(Ordering::Relaxed) != usize::MAX) {
            return false;
        }
        let tail_bits = self.bits % usize::BITS as usize;
        let tail_mask = if tail_bits == 0 {
            usize::MAX
        } else {
            (1usize << tail_bits) - 1
        };
        (last.load(Ordering::Relaxed) & tail_mask) == tail_mask
    }
}

impl core::fmt::Debug for AtomicBitSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtomicBitSet")
            .field("bits", &self.bits)
            .field("set", &self.cardinality())
            .finish()
    }
}

#[inline(always)]
fn bit_word_mask(bit: usize) -> (usize, usize) {
    // `usize::BITS` is always a power-of-two (32 or 64), so use shifts/masks.
    // This is on the hot path for every computed node.
    #[cfg(target_pointer_width = "64")]
    {
        (bit >> 6, 1usize << (bit & 63))
    }
    #[cfg(not(target_pointer_width = "64"))]
    {
        (bit >> 5, 1usize << (bit & 31))
    }
}
