//! Windowed normalization wrapper around the scan engine.
//!
//! When a store carries transform flags the haystack must be normalized
//! before matching. Rather than materialize a normalized copy of the whole
//! input, the wrapper walks it in 4 MiB windows, normalizes each window
//! into a reusable buffer, scans that, and remaps results to original
//! coordinates via the back-map.
//!
//! Each window is extended with `largest_pattern_length - 1` trailing
//! source bytes so matches beginning near the window end can complete;
//! results whose remapped start falls in the extension belong to the next
//! window and are discarded here.

use crate::results::Match;
use crate::scan::{self, Filters, ScanContext};
use crate::stats::ScanStats;
use crate::transform::Transform;

pub(crate) const WINDOW_SIZE: usize = 4 * 1024 * 1024;

pub(crate) fn run(
    ctx: &ScanContext<'_>,
    transform: &Transform,
    needs_backmap: bool,
    haystack: &[u8],
    filters: Filters,
    threads: usize,
    chunk_size: usize,
) -> (Vec<Match>, ScanStats) {
    let n = haystack.len();
    let overlap = (ctx.largest as usize).saturating_sub(1);

    let mut all = Vec::new();
    let mut stats = ScanStats::default();
    let mut normalized = Vec::new();
    let mut backmap = Vec::new();

    let mut base = 0usize;
    while base < n {
        let owned_end = (base + WINDOW_SIZE).min(n);
        let source_end = (owned_end + overlap).min(n);
        let owned_len = owned_end - base;

        if needs_backmap {
            transform.apply_with_backmap(&haystack[base..source_end], &mut normalized, &mut backmap);
        } else {
            transform.apply(&haystack[base..source_end], &mut normalized);
        }

        let (window_matches, window_stats) =
            scan::run(ctx, &normalized, filters, threads, chunk_size);
        stats.merge(&window_stats);

        for m in window_matches {
            let pos = m.offset as usize;
            if needs_backmap {
                let start = backmap[pos] as usize;
                if start >= owned_len {
                    continue;
                }
                let end = backmap[pos + m.len as usize - 1] as usize;
                all.push(Match {
                    offset: (base + start) as u64,
                    len: (end - start + 1) as u32,
                });
            } else {
                // Case folding is 1:1; normalized offsets are source offsets.
                if pos >= owned_len {
                    continue;
                }
                all.push(Match {
                    offset: (base + pos) as u64,
                    len: m.len,
                });
            }
        }

        base = owned_end;
    }

    (all, stats)
}
