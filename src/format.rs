//! Compiled-store binary format: constants, header codec, section layout.
//!
//! The format is position-based and little-endian. A store is a 72-byte
//! global header followed by, in order: the pattern store, the bloom
//! section, the hash index array, the packed bucket-data region, and an
//! optional short-matcher section. The file must end exactly at the last
//! section; loaders reject anything else.
//!
//! Section views are byte ranges, not typed slices: nothing in the layout
//! guarantees alignment (the pattern store has arbitrary length), so all
//! multi-byte reads go through `from_le_bytes` on byte slices.

use std::ops::Range;

use crate::error::FormatError;

pub const STORE_MAGIC: [u8; 8] = *b"0MGM4tCH";
pub const BLOOM_MAGIC: [u8; 8] = *b"0MG8L0oM";
pub const HASH_MAGIC: [u8; 8] = *b"0MG*H4sH";
pub const SHORT_MAGIC: [u8; 8] = *b"0MG5HOrT";

pub const STORE_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 72;

pub const FLAG_CASE_FOLD: u32 = 1 << 1;
pub const FLAG_IGNORE_PUNCT: u32 = 1 << 2;
pub const FLAG_ELIDE_WHITESPACE: u32 = 1 << 3;

/// Index-array value marking an empty slot.
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Bytes per serialized bucket pattern entry: offset (8), len (4),
/// reserved (4).
pub const BUCKET_ENTRY_LEN: usize = 16;
/// Bytes before a bucket's entries: key (4), count (4).
pub const BUCKET_PREFIX_LEN: usize = 8;

pub const SHORT_BITMAP1_LEN: usize = 32;
pub const SHORT_BITMAP2_LEN: usize = 8192;

/// Decoded 72-byte global header.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StoreHeader {
    pub version: u32,
    pub flags: u32,
    pub pattern_store_size: u64,
    pub stored_pattern_count: u32,
    pub smallest_pattern_len: u32,
    pub largest_pattern_len: u32,
    pub bloom_size: u32,
    pub bucket_data_size: u32,
    pub table_size: u32,
    pub occupied_buckets: u32,
    pub min_bucket_size: u32,
    pub max_bucket_size: u32,
    pub short_matcher_size: u32,
    pub load_factor: f32,
    pub avg_bucket_size: f32,
}

impl StoreHeader {
    pub fn case_fold(&self) -> bool {
        self.flags & FLAG_CASE_FOLD != 0
    }

    pub fn ignore_punct(&self) -> bool {
        self.flags & FLAG_IGNORE_PUNCT != 0
    }

    pub fn elide_whitespace(&self) -> bool {
        self.flags & FLAG_ELIDE_WHITESPACE != 0
    }

    /// True if any normalization transform was compiled in.
    pub fn has_transform(&self) -> bool {
        self.flags & (FLAG_CASE_FOLD | FLAG_IGNORE_PUNCT | FLAG_ELIDE_WHITESPACE) != 0
    }

    /// True if normalized offsets differ from source offsets (a back-map is
    /// required to report original coordinates).
    pub fn needs_backmap(&self) -> bool {
        self.flags & (FLAG_IGNORE_PUNCT | FLAG_ELIDE_WHITESPACE) != 0
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..8].copy_from_slice(&STORE_MAGIC);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.flags.to_le_bytes());
        out[16..24].copy_from_slice(&self.pattern_store_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.stored_pattern_count.to_le_bytes());
        out[28..32].copy_from_slice(&self.smallest_pattern_len.to_le_bytes());
        out[32..36].copy_from_slice(&self.largest_pattern_len.to_le_bytes());
        out[36..40].copy_from_slice(&self.bloom_size.to_le_bytes());
        out[40..44].copy_from_slice(&self.bucket_data_size.to_le_bytes());
        out[44..48].copy_from_slice(&self.table_size.to_le_bytes());
        out[48..52].copy_from_slice(&self.occupied_buckets.to_le_bytes());
        out[52..56].copy_from_slice(&self.min_bucket_size.to_le_bytes());
        out[56..60].copy_from_slice(&self.max_bucket_size.to_le_bytes());
        out[60..64].copy_from_slice(&self.short_matcher_size.to_le_bytes());
        out[64..68].copy_from_slice(&self.load_factor.to_le_bytes());
        out[68..72].copy_from_slice(&self.avg_bucket_size.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_LEN {
            return Err(FormatError::Truncated {
                section: "header",
                need: HEADER_LEN as u64,
                have: bytes.len() as u64,
            });
        }
        if bytes[0..8] != STORE_MAGIC {
            return Err(FormatError::BadMagic { section: "header" });
        }
        let version = read_u32(bytes, 8);
        if version != STORE_VERSION {
            return Err(FormatError::UnsupportedVersion { version });
        }
        Ok(Self {
            version,
            flags: read_u32(bytes, 12),
            pattern_store_size: read_u64(bytes, 16),
            stored_pattern_count: read_u32(bytes, 24),
            smallest_pattern_len: read_u32(bytes, 28),
            largest_pattern_len: read_u32(bytes, 32),
            bloom_size: read_u32(bytes, 36),
            bucket_data_size: read_u32(bytes, 40),
            table_size: read_u32(bytes, 44),
            occupied_buckets: read_u32(bytes, 48),
            min_bucket_size: read_u32(bytes, 52),
            max_bucket_size: read_u32(bytes, 56),
            short_matcher_size: read_u32(bytes, 60),
            load_factor: f32::from_le_bytes([bytes[64], bytes[65], bytes[66], bytes[67]]),
            avg_bucket_size: f32::from_le_bytes([bytes[68], bytes[69], bytes[70], bytes[71]]),
        })
    }
}

#[inline]
pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
pub(crate) fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Byte ranges of the short-matcher section within a store.
#[derive(Clone, Debug)]
pub struct ShortLayout {
    pub bitmap1: Range<usize>,
    pub bitmap2: Range<usize>,
    pub len1: u32,
    pub len2: u32,
    pub len3: u32,
    pub len4: u32,
    pub arr3: Range<usize>,
    pub arr4: Range<usize>,
}

/// Byte ranges of every section within a store buffer.
///
/// Ranges index the full store buffer (header included), so views can be
/// taken with plain slicing against the mapped bytes.
#[derive(Clone, Debug)]
pub struct SectionLayout {
    pub pattern_store: Range<usize>,
    pub bloom_bit_size: u32,
    pub bloom_bits: Range<usize>,
    pub index: Range<usize>,
    pub bucket_data: Range<usize>,
    pub short: Option<ShortLayout>,
}

impl SectionLayout {
    /// Walks the section chain described by `header`, validating magics and
    /// sizes as it goes. The buffer must end exactly at the last section.
    pub fn parse(data: &[u8], header: &StoreHeader) -> Result<Self, FormatError> {
        if data.len() < HEADER_LEN {
            return Err(FormatError::Truncated {
                section: "header",
                need: HEADER_LEN as u64,
                have: data.len() as u64,
            });
        }
        let mut cursor = Cursor {
            data,
            pos: HEADER_LEN,
        };

        let pattern_store = cursor.take(header.pattern_store_size, "pattern store")?;

        cursor.expect_magic(&BLOOM_MAGIC, "bloom")?;
        let bloom_bit_size = cursor.take_u32("bloom")?;
        let _reserved = cursor.take_u32("bloom")?;
        if !bloom_bit_size.is_power_of_two() {
            return Err(FormatError::NotPowerOfTwo {
                field: "bloom bit size",
                value: u64::from(bloom_bit_size),
            });
        }
        if bloom_bit_size >> 3 != header.bloom_size {
            return Err(FormatError::SizeMismatch {
                section: "bloom",
                stored: u64::from(header.bloom_size),
                actual: u64::from(bloom_bit_size >> 3),
            });
        }
        let bloom_bits = cursor.take(u64::from(header.bloom_size), "bloom")?;

        cursor.expect_magic(&HASH_MAGIC, "hash index")?;
        if !header.table_size.is_power_of_two() {
            return Err(FormatError::NotPowerOfTwo {
                field: "table size",
                value: u64::from(header.table_size),
            });
        }
        let index = cursor.take(u64::from(header.table_size) * 4, "hash index")?;
        let bucket_data = cursor.take(u64::from(header.bucket_data_size), "bucket data")?;

        let short = if header.short_matcher_size > 0 {
            let start = cursor.pos;
            cursor.expect_magic(&SHORT_MAGIC, "short matcher")?;
            let bitmap1 = cursor.take(SHORT_BITMAP1_LEN as u64, "short matcher")?;
            let bitmap2 = cursor.take(SHORT_BITMAP2_LEN as u64, "short matcher")?;
            let len1 = cursor.take_u32("short matcher")?;
            let len2 = cursor.take_u32("short matcher")?;
            let len3 = cursor.take_u32("short matcher")?;
            let len4 = cursor.take_u32("short matcher")?;
            let arr3 = cursor.take(u64::from(len3) * 4, "short matcher")?;
            let arr4 = cursor.take(u64::from(len4) * 4, "short matcher")?;
            let actual = (cursor.pos - start) as u64;
            if actual != u64::from(header.short_matcher_size) {
                return Err(FormatError::SizeMismatch {
                    section: "short matcher",
                    stored: u64::from(header.short_matcher_size),
                    actual,
                });
            }
            Some(ShortLayout {
                bitmap1,
                bitmap2,
                len1,
                len2,
                len3,
                len4,
                arr3,
                arr4,
            })
        } else {
            None
        };

        if cursor.pos != data.len() {
            return Err(FormatError::TrailingBytes {
                extra: (data.len() - cursor.pos) as u64,
            });
        }

        Ok(Self {
            pattern_store,
            bloom_bit_size,
            bloom_bits,
            index,
            bucket_data,
            short,
        })
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn take(&mut self, len: u64, section: &'static str) -> Result<Range<usize>, FormatError> {
        let remaining = (self.data.len() - self.pos) as u64;
        if len > remaining {
            return Err(FormatError::Truncated {
                section,
                need: len,
                have: remaining,
            });
        }
        let start = self.pos;
        self.pos += len as usize;
        Ok(start..self.pos)
    }

    fn take_u32(&mut self, section: &'static str) -> Result<u32, FormatError> {
        let range = self.take(4, section)?;
        Ok(read_u32(self.data, range.start))
    }

    fn expect_magic(&mut self, magic: &[u8; 8], section: &'static str) -> Result<(), FormatError> {
        let range = self.take(8, section)?;
        if &self.data[range] != magic {
            return Err(FormatError::BadMagic { section });
        }
        Ok(())
    }
}
