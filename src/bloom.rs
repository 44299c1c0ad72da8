//! Bloom pre-filter over 4-byte gram keys.
//!
//! The filter gates the bucket probe on the scan hot path: a negative
//! answer proves the gram starts no stored pattern, so the (colder) index
//! array is never touched. Sized at ~16 bits per bucket key and rounded to
//! a power of two, the false-positive rate stays low enough that bucket
//! misses are rare.
//!
//! Three probes per key: `h1`, `h1 + h2`, `h1 + 2*h2`, where `h1` is the
//! gram mixer and `h2` is the gram times the 32-bit golden ratio. All
//! positions are masked by `bit_size - 1`, which requires `bit_size` to be
//! a power of two.

use std::io::{self, Write};

use crate::format::BLOOM_MAGIC;
use crate::hash::mix_gram;

const GOLDEN_RATIO_32: u32 = 0x9e37_79b1;

/// Build-time bloom filter owning its bit array.
pub struct BloomFilter {
    bit_size: u32,
    words: Vec<u64>,
}

impl BloomFilter {
    /// Creates a filter with at least `requested_bits` bits, rounded up to a
    /// whole number of 64-bit words and then to a power-of-two byte size.
    pub fn with_bits(requested_bits: u64) -> Self {
        let bytes = (((requested_bits + 63) & !63) >> 3).max(8);
        let bytes = bytes.next_power_of_two();
        let bit_size = (bytes << 3) as u32;
        Self {
            bit_size,
            words: vec![0u64; (bit_size >> 6) as usize],
        }
    }

    /// Size of the bit array in bytes (excludes the section prefix).
    pub fn byte_size(&self) -> u32 {
        self.bit_size >> 3
    }

    pub fn insert(&mut self, key: u32) {
        let (p0, p1, p2) = probes(key, self.bit_size - 1);
        self.words[(p0 >> 6) as usize] |= 1u64 << (p0 & 63);
        self.words[(p1 >> 6) as usize] |= 1u64 << (p1 & 63);
        self.words[(p2 >> 6) as usize] |= 1u64 << (p2 & 63);
    }

    pub fn query(&self, key: u32) -> bool {
        let (p0, p1, p2) = probes(key, self.bit_size - 1);
        self.words[(p0 >> 6) as usize] >> (p0 & 63) & 1 != 0
            && self.words[(p1 >> 6) as usize] >> (p1 & 63) & 1 != 0
            && self.words[(p2 >> 6) as usize] >> (p2 & 63) & 1 != 0
    }

    /// Writes the bloom section: magic, bit size, reserved word, bit data.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&BLOOM_MAGIC)?;
        w.write_all(&self.bit_size.to_le_bytes())?;
        w.write_all(&0u32.to_le_bytes())?;
        for word in &self.words {
            w.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }
}

/// Read-only view over a serialized bit array.
#[derive(Clone, Copy, Debug)]
pub struct BloomView<'a> {
    bit_size: u32,
    bits: &'a [u8],
}

impl<'a> BloomView<'a> {
    /// `bits` must be `bit_size / 8` bytes; `bit_size` must be a power of
    /// two (both enforced by the loader).
    pub fn new(bit_size: u32, bits: &'a [u8]) -> Self {
        debug_assert!(bit_size.is_power_of_two());
        debug_assert_eq!(bits.len(), (bit_size >> 3) as usize);
        Self { bit_size, bits }
    }

    #[inline(always)]
    pub fn query(&self, key: u32) -> bool {
        let (p0, p1, p2) = probes(key, self.bit_size - 1);
        self.bit(p0) && self.bit(p1) && self.bit(p2)
    }

    #[inline(always)]
    fn bit(&self, pos: u32) -> bool {
        self.bits[(pos >> 3) as usize] >> (pos & 7) & 1 != 0
    }
}

#[inline(always)]
fn probes(key: u32, mask: u32) -> (u32, u32, u32) {
    let h1 = mix_gram(key);
    let h2 = key.wrapping_mul(GOLDEN_RATIO_32);
    (
        h1 & mask,
        h1.wrapping_add(h2) & mask,
        h1.wrapping_add(h2.wrapping_mul(2)) & mask,
    )
}
