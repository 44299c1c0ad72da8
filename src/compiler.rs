//! Streaming compiler: patterns in, compiled store out.
//!
//! The compiler writes a zeroed header placeholder, streams long patterns
//! into the pattern store region as they arrive, and keeps everything else
//! (bucket table, short-matcher accumulator, dedupe sets) in memory. On
//! `finish` it serializes the remaining sections and rewrites the header
//! with the final statistics. Until that rewrite the artifact carries no
//! valid magic, so a failed or interrupted build can never be loaded.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::bloom::BloomFilter;
use crate::bucket::BucketTable;
use crate::dedupe::DedupeSet;
use crate::error::CompileError;
use crate::format::{
    StoreHeader, EMPTY_SLOT, FLAG_CASE_FOLD, FLAG_ELIDE_WHITESPACE, FLAG_IGNORE_PUNCT, HASH_MAGIC,
    HEADER_LEN, STORE_VERSION,
};
use crate::hash::pack_gram;
use crate::pattern_store::PatternStore;
use crate::short_matcher::ShortMatcherBuilder;
use crate::stats::CompileStats;
use crate::transform::Transform;

/// Bloom bits budgeted per bucket-table slot.
const BLOOM_BITS_PER_ENTRY: u64 = 16;

/// Longest pattern length routed to the short matcher.
const SHORT_PATTERN_MAX: usize = 4;

/// Normalization switches baked into a compiled store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Fold ASCII letters to uppercase.
    pub case_fold: bool,
    /// Drop ASCII punctuation.
    pub ignore_punct: bool,
    /// Collapse whitespace runs to a single space.
    pub elide_whitespace: bool,
}

impl CompileOptions {
    pub(crate) fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.case_fold {
            flags |= FLAG_CASE_FOLD;
        }
        if self.ignore_punct {
            flags |= FLAG_IGNORE_PUNCT;
        }
        if self.elide_whitespace {
            flags |= FLAG_ELIDE_WHITESPACE;
        }
        flags
    }

    pub(crate) fn any(&self) -> bool {
        self.case_fold || self.ignore_punct || self.elide_whitespace
    }
}

/// Streaming store builder. Single-owner; not for concurrent use.
pub struct Compiler {
    out: BufWriter<File>,
    flags: u32,
    transform: Option<Transform>,
    scratch: Vec<u8>,
    store: PatternStore,
    table: BucketTable,
    short: ShortMatcherBuilder,
    short_dedupe: DedupeSet,
    stats: CompileStats,
}

impl Compiler {
    /// Opens `path` for writing and reserves header space.
    pub fn create<P: AsRef<Path>>(path: P, options: CompileOptions) -> Result<Self, CompileError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        out.write_all(&[0u8; HEADER_LEN])?;

        let transform = options
            .any()
            .then(|| Transform::new(options.case_fold, options.ignore_punct, options.elide_whitespace));

        Ok(Self {
            out,
            flags: options.flags(),
            transform,
            scratch: Vec::new(),
            store: PatternStore::new(),
            table: BucketTable::new(),
            short: ShortMatcherBuilder::new(),
            short_dedupe: DedupeSet::new(),
            stats: CompileStats::default(),
        })
    }

    /// Adds one pattern, normalizing it first when a transform is active.
    ///
    /// Duplicates are counted and dropped. A pattern that is empty, or that
    /// normalizes to nothing, is rejected with
    /// [`CompileError::EmptyPattern`].
    pub fn add(&mut self, pattern: &[u8]) -> Result<(), CompileError> {
        if pattern.is_empty() {
            return Err(CompileError::EmptyPattern);
        }

        let normalized: &[u8] = match &self.transform {
            Some(t) => {
                t.apply(pattern, &mut self.scratch);
                &self.scratch
            }
            None => pattern,
        };
        if normalized.is_empty() {
            return Err(CompileError::EmptyPattern);
        }
        let len = normalized.len() as u32;

        if normalized.len() <= SHORT_PATTERN_MAX {
            if !self.short_dedupe.insert(normalized) {
                self.stats.duplicate_patterns += 1;
                return Ok(());
            }
            self.short.add(normalized);
            self.stats.short_pattern_count += 1;
            self.stats.note_pattern_len(len);
        } else {
            match self.store.store(&mut self.out, normalized)? {
                None => {
                    self.stats.duplicate_patterns += 1;
                    return Ok(());
                }
                Some(offset) => {
                    self.table.insert(pack_gram(normalized), offset, len);
                    self.stats.stored_pattern_count += 1;
                    self.stats.note_pattern_len(len);
                }
            }
        }
        Ok(())
    }

    /// Running statistics (final values only after `finish`).
    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    /// Serializes the remaining sections, rewrites the header, and flushes.
    pub fn finish(mut self) -> Result<CompileStats, CompileError> {
        self.stats.total_stored_bytes = self.store.bytes_written();

        // Bucket lists are visited longest-first at scan time.
        self.table.sort_buckets();

        let mut bloom =
            BloomFilter::with_bits(u64::from(self.table.table_size()) * BLOOM_BITS_PER_ENTRY);
        let mut min_bucket = u32::MAX;
        let mut max_bucket = 0u32;
        for (_, key, patterns) in self.table.iter_occupied() {
            bloom.insert(key);
            let count = patterns.len() as u32;
            min_bucket = min_bucket.min(count);
            max_bucket = max_bucket.max(count);
        }

        bloom.write_to(&mut self.out)?;

        self.out.write_all(&HASH_MAGIC)?;
        let index_start = self.out.stream_position()?;
        let table_size = self.table.table_size() as usize;
        let mut index = vec![EMPTY_SLOT; table_size];
        // Placeholder; rewritten once bucket offsets are known.
        for slot in &index {
            self.out.write_all(&slot.to_le_bytes())?;
        }

        let bucket_start = self.out.stream_position()?;
        for (slot_idx, key, patterns) in self.table.iter_occupied() {
            index[slot_idx] = (self.out.stream_position()? - bucket_start) as u32;
            self.out.write_all(&key.to_le_bytes())?;
            self.out
                .write_all(&(patterns.len() as u32).to_le_bytes())?;
            for p in patterns {
                self.out.write_all(&p.offset.to_le_bytes())?;
                self.out.write_all(&p.len.to_le_bytes())?;
                self.out.write_all(&0u32.to_le_bytes())?;
            }
        }
        let bucket_data_size = (self.out.stream_position()? - bucket_start) as u32;

        let mut short_matcher_size = 0;
        if self.short.has_patterns() {
            self.short.finish();
            short_matcher_size = self.short.encoded_len();
            self.short.write_to(&mut self.out)?;
        }

        self.out.seek(SeekFrom::Start(index_start))?;
        for slot in &index {
            self.out.write_all(&slot.to_le_bytes())?;
        }

        let occupied = self.table.occupied();
        let header = StoreHeader {
            version: STORE_VERSION,
            flags: self.flags,
            pattern_store_size: self.store.bytes_written(),
            stored_pattern_count: self.stats.stored_pattern_count,
            smallest_pattern_len: self.stats.smallest_pattern_len,
            largest_pattern_len: self.stats.largest_pattern_len,
            bloom_size: bloom.byte_size(),
            bucket_data_size,
            table_size: self.table.table_size(),
            occupied_buckets: occupied,
            min_bucket_size: if min_bucket == u32::MAX { 0 } else { min_bucket },
            max_bucket_size: max_bucket,
            short_matcher_size,
            load_factor: occupied as f32 / self.table.table_size() as f32,
            avg_bucket_size: if occupied > 0 {
                self.stats.stored_pattern_count as f32 / occupied as f32
            } else {
                0.0
            },
        };

        self.out.seek(SeekFrom::Start(0))?;
        self.out.write_all(&header.encode())?;
        self.out.flush()?;
        Ok(self.stats)
    }
}
