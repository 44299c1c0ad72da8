//! Per-position scan engine and its worker fan-out.
//!
//! Every haystack position is a candidate match start. The long path
//! (patterns of length >= 5) forms a 4-byte gram, gates it through the
//! bloom filter, probes the bucket index, and byte-compares the bucket's
//! candidates longest-first. The short path answers lengths 4 down to 1
//! independently via the short matcher. Filter predicates apply uniformly
//! to both paths.
//!
//! Positions are partitioned into power-of-two chunks scheduled statically
//! across workers: worker `t` owns chunks `t, t + T, t + 2T, ...`. Workers
//! share only the read-only context; each accumulates matches and counters
//! privately, and the caller merges after join. For fixed inputs the result
//! set is identical for every legal thread count; ordering is imposed later
//! by the result pipeline.

use std::thread;

use crate::bloom::BloomView;
use crate::bucket::{self, BucketView};
use crate::classify::{is_line_break, is_word};
use crate::hash::pack_gram;
use crate::results::Match;
use crate::short_matcher::ShortMatcherView;
use crate::stats::ScanStats;

/// Scan configuration: post-filters, match predicates, concurrency knobs.
///
/// All booleans default to off. `threads == 0` means one worker per
/// hardware thread; `chunk_size == 0` means 4096, and any other value is
/// rounded up to a power of two.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Drop results overlapping a previously kept result.
    pub no_overlap: bool,
    /// Keep only the longest result at each offset.
    pub longest_only: bool,
    /// Match only where wordness transitions, and end before a non-word
    /// byte.
    pub word_boundary: bool,
    /// The byte before the match (if any) must not be a word character.
    pub word_prefix: bool,
    /// The byte after the match (if any) must not be a word character.
    pub word_suffix: bool,
    /// The match must start at the beginning of a line.
    pub line_start: bool,
    /// The match must end at the end of a line.
    pub line_end: bool,
    /// Worker thread count; 0 selects the hardware maximum.
    pub threads: usize,
    /// Position-chunk size; 0 selects the default (4096).
    pub chunk_size: usize,
}

/// Match predicates, split from [`ScanOptions`] so workers carry only what
/// the inner loop reads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Filters {
    pub word_boundary: bool,
    pub word_prefix: bool,
    pub word_suffix: bool,
    pub line_start: bool,
    pub line_end: bool,
}

impl From<&ScanOptions> for Filters {
    fn from(options: &ScanOptions) -> Self {
        Self {
            word_boundary: options.word_boundary,
            word_prefix: options.word_prefix,
            word_suffix: options.word_suffix,
            line_start: options.line_start,
            line_end: options.line_end,
        }
    }
}

/// Read-only view of every store section a worker touches.
#[derive(Clone, Copy)]
pub(crate) struct ScanContext<'a> {
    pub smallest: u32,
    pub largest: u32,
    pub pattern_store: &'a [u8],
    pub bloom: BloomView<'a>,
    pub index: &'a [u8],
    pub table_mask: u32,
    pub bucket_data: &'a [u8],
    pub short: Option<ShortMatcherView<'a>>,
}

/// Runs the engine over `haystack` with a static chunk schedule.
pub(crate) fn run(
    ctx: &ScanContext<'_>,
    haystack: &[u8],
    filters: Filters,
    threads: usize,
    chunk_size: usize,
) -> (Vec<Match>, ScanStats) {
    if haystack.is_empty() {
        return (Vec::new(), ScanStats::default());
    }

    let n = haystack.len();
    let chunk_count = n.div_ceil(chunk_size);
    let workers = threads.min(chunk_count).max(1);

    if workers == 1 {
        let mut matches = Vec::new();
        let mut stats = ScanStats::default();
        scan_range(ctx, haystack, filters, 0, n, &mut matches, &mut stats);
        return (matches, stats);
    }

    let mut matches = Vec::new();
    let mut stats = ScanStats::default();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let ctx = *ctx;
                scope.spawn(move || {
                    let mut local = Vec::new();
                    let mut local_stats = ScanStats::default();
                    let mut start = worker * chunk_size;
                    let stride = chunk_size * workers;
                    while start < n {
                        let end = (start + chunk_size).min(n);
                        scan_range(
                            &ctx,
                            haystack,
                            filters,
                            start,
                            end,
                            &mut local,
                            &mut local_stats,
                        );
                        start += stride;
                    }
                    (local, local_stats)
                })
            })
            .collect();

        for handle in handles {
            let (local, local_stats) = handle.join().expect("scan worker panicked");
            matches.extend_from_slice(&local);
            stats.merge(&local_stats);
        }
    });
    (matches, stats)
}

/// Evaluates every position in `start..end`.
fn scan_range(
    ctx: &ScanContext<'_>,
    haystack: &[u8],
    filters: Filters,
    start: usize,
    end: usize,
    out: &mut Vec<Match>,
    stats: &mut ScanStats,
) {
    let n = haystack.len();
    let use_long = ctx.largest >= 5;
    let use_short = ctx.smallest <= 4 && ctx.short.is_some();

    for pos in start..end {
        if filters.word_boundary {
            let curr_is_word = is_word(haystack[pos]);
            let prev_is_word = pos > 0 && is_word(haystack[pos - 1]);
            if curr_is_word == prev_is_word {
                continue;
            }
        }

        let remaining = n - pos;

        if use_long && remaining >= 4 {
            stats.attempts += 1;
            let gram = pack_gram(&haystack[pos..]);
            if !ctx.bloom.query(gram) {
                stats.filtered += 1;
            } else {
                match bucket::probe(ctx.index, ctx.bucket_data, ctx.table_mask, gram) {
                    None => stats.misses += 1,
                    Some(slot) => {
                        stats.hits += 1;
                        scan_bucket(ctx, haystack, pos, slot, filters, out, stats);
                    }
                }
            }
        }

        if use_short {
            if let Some(sm) = &ctx.short {
                short_pass(sm, haystack, pos, filters, out, stats);
            }
        }
    }
}

/// Byte-compares every candidate in a bucket at `pos`, longest first.
fn scan_bucket(
    ctx: &ScanContext<'_>,
    haystack: &[u8],
    pos: usize,
    slot: u32,
    filters: Filters,
    out: &mut Vec<Match>,
    stats: &mut ScanStats,
) {
    let n = haystack.len();
    let remaining = n - pos;
    let prefix_ok = !filters.word_prefix || pos == 0 || !is_word(haystack[pos - 1]);
    let start_ok = !filters.line_start || at_line_start(haystack, pos);

    for candidate in BucketView::at(ctx.bucket_data, slot).patterns() {
        let len = candidate.len as usize;
        if len > remaining {
            continue;
        }
        stats.comparisons += 1;

        let offset = candidate.offset as usize;
        let pattern = &ctx.pattern_store[offset..offset + len];
        let window = &haystack[pos..pos + len];
        // First/last bytes reject most candidates before the full compare.
        if window[0] != pattern[0] || window[len - 1] != pattern[len - 1] {
            continue;
        }
        if window[1..len - 1] != pattern[1..len - 1] {
            continue;
        }

        let match_end = pos + len;
        if filters.word_boundary && match_end < n && is_word(haystack[match_end]) {
            continue;
        }
        if !prefix_ok {
            continue;
        }
        if filters.word_suffix && match_end < n && is_word(haystack[match_end]) {
            continue;
        }
        if !start_ok {
            continue;
        }
        if filters.line_end && !at_line_end(haystack, pos, len) {
            continue;
        }

        out.push(Match {
            offset: pos as u64,
            len: candidate.len,
        });
    }
}

/// Short-path evaluation at `pos`: lengths 4 down to 1, each independent.
fn short_pass(
    sm: &ShortMatcherView<'_>,
    haystack: &[u8],
    pos: usize,
    filters: Filters,
    out: &mut Vec<Match>,
    stats: &mut ScanStats,
) {
    let n = haystack.len();
    let remaining = n - pos;
    let window = &haystack[pos..];
    let prefix_ok = !filters.word_prefix || pos == 0 || !is_word(haystack[pos - 1]);
    let start_ok = !filters.line_start || at_line_start(haystack, pos);

    let mut emit = |len: usize, out: &mut Vec<Match>, stats: &mut ScanStats| {
        let match_end = pos + len;
        let end_non_word = match_end >= n || !is_word(haystack[match_end]);
        let boundary_ok = !filters.word_boundary || end_non_word;
        let suffix_ok = !filters.word_suffix || end_non_word;
        let end_ok = !filters.line_end || at_line_end(haystack, pos, len);
        if boundary_ok && prefix_ok && suffix_ok && start_ok && end_ok {
            stats.hits += 1;
            out.push(Match {
                offset: pos as u64,
                len: len as u32,
            });
        } else {
            stats.misses += 1;
        }
    };

    if sm.has4() && remaining >= 4 && sm.query4(window) {
        emit(4, out, stats);
    }
    if sm.has3() && remaining >= 3 && sm.query3(window) {
        emit(3, out, stats);
    }
    if sm.has2() && remaining >= 2 && sm.query2(window) {
        emit(2, out, stats);
    }
    if sm.has1() && sm.query1(window[0]) {
        emit(1, out, stats);
    }
}

#[inline(always)]
fn at_line_start(haystack: &[u8], pos: usize) -> bool {
    pos == 0 || is_line_break(haystack[pos - 1])
}

#[inline(always)]
fn at_line_end(haystack: &[u8], pos: usize, len: usize) -> bool {
    let end = pos + len;
    end >= haystack.len() || is_line_break(haystack[end])
}
