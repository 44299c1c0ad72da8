//! Counter structs reported by the compiler and the scan engine.

/// Counters accumulated while building a compiled store.
///
/// `smallest_pattern_len` starts at `u32::MAX` so the first accepted pattern
/// establishes the minimum; a store compiled from zero patterns keeps that
/// sentinel in its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileStats {
    /// Total bytes of all accepted (normalized) patterns, duplicates excluded.
    pub total_input_bytes: u64,
    /// Bytes occupying the pattern store region.
    pub total_stored_bytes: u64,
    /// Unique patterns of length >= 5 in the pattern store.
    pub stored_pattern_count: u32,
    /// Unique patterns of length 1-4 in the short matcher.
    pub short_pattern_count: u32,
    /// Patterns dropped as duplicates (after normalization).
    pub duplicate_patterns: u32,
    /// Smallest accepted pattern length.
    pub smallest_pattern_len: u32,
    /// Largest accepted pattern length.
    pub largest_pattern_len: u32,
}

impl Default for CompileStats {
    fn default() -> Self {
        Self {
            total_input_bytes: 0,
            total_stored_bytes: 0,
            stored_pattern_count: 0,
            short_pattern_count: 0,
            duplicate_patterns: 0,
            smallest_pattern_len: u32::MAX,
            largest_pattern_len: 0,
        }
    }
}

impl CompileStats {
    pub(crate) fn note_pattern_len(&mut self, len: u32) {
        if len < self.smallest_pattern_len {
            self.smallest_pattern_len = len;
        }
        if len > self.largest_pattern_len {
            self.largest_pattern_len = len;
        }
        self.total_input_bytes += u64::from(len);
    }
}

/// Counters accumulated during a single scan.
///
/// Workers count into private copies; the values here are the summed totals.
/// `comparisons` is implementation-defined (it depends on the bucket-loop
/// short-circuit strategy); the other counters are stable for a given store
/// and haystack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Positions where the long path formed a gram and consulted the bloom
    /// filter.
    pub attempts: u64,
    /// Bucket probes (or short-matcher lookups) that produced a match.
    pub hits: u64,
    /// Bucket probes that found no bucket, plus short-matcher candidates
    /// rejected by filters.
    pub misses: u64,
    /// Grams rejected by the bloom filter before any bucket probe.
    pub filtered: u64,
    /// Candidate patterns byte-compared against the haystack.
    pub comparisons: u64,
}

impl ScanStats {
    pub(crate) fn merge(&mut self, other: &ScanStats) {
        self.attempts += other.attempts;
        self.hits += other.hits;
        self.misses += other.misses;
        self.filtered += other.filtered;
        self.comparisons += other.comparisons;
    }
}
