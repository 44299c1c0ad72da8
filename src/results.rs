//! Match records and the result-ordering pipeline.
//!
//! Thread-local vectors merge into one, get radix-sorted into the canonical
//! order (length descending, then offset ascending), and optionally pass
//! through the longest-only and no-overlap filters. The sort is an LSD
//! radix over a composite key: four passes over the complemented length,
//! then eight over the offset, so the most significant comparison
//! (descending length) lands last.

use crate::stats::ScanStats;

/// One occurrence of a dictionary pattern in the haystack.
///
/// Offsets and lengths are in original haystack coordinates, even when the
/// store was compiled with a normalization transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Match {
    pub offset: u64,
    pub len: u32,
}

impl Match {
    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.len)
    }

    /// The matched bytes within `haystack`.
    ///
    /// # Panics
    /// Panics if the match does not lie within `haystack` (it always does
    /// for the haystack the scan ran over).
    #[inline]
    pub fn bytes<'h>(&self, haystack: &'h [u8]) -> &'h [u8] {
        &haystack[self.offset as usize..self.end() as usize]
    }
}

/// Ordered scan results plus the summed statistics.
#[derive(Debug, Default)]
pub struct Matches {
    matches: Vec<Match>,
    stats: ScanStats,
}

impl Matches {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.matches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn into_vec(self) -> Vec<Match> {
        self.matches
    }
}

impl<'a> IntoIterator for &'a Matches {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// Sorts, applies the post-filters in their fixed order, and packages the
/// final results.
pub(crate) fn finalize(
    mut matches: Vec<Match>,
    longest_only: bool,
    no_overlap: bool,
    stats: ScanStats,
) -> Matches {
    radix_sort(&mut matches);
    if longest_only {
        keep_longest_per_offset(&mut matches);
    }
    if no_overlap {
        drop_overlapping(&mut matches);
    }
    Matches { matches, stats }
}

/// Pass count: 4 bytes of `!len`, 8 bytes of offset.
const RADIX_PASSES: usize = 12;

/// LSD radix sort into (length desc, offset asc) order.
///
/// The pass count is even, so after the final buffer swap the sorted data
/// sits back in `v`.
pub(crate) fn radix_sort(v: &mut Vec<Match>) {
    let n = v.len();
    if n < 2 {
        return;
    }

    #[inline]
    fn key_byte(m: &Match, pass: usize) -> usize {
        let byte = if pass < 4 {
            (!m.len >> (pass * 8)) as u8
        } else {
            (m.offset >> ((pass - 4) * 8)) as u8
        };
        usize::from(byte)
    }

    let mut tmp = vec![Match::default(); n];
    for pass in 0..RADIX_PASSES {
        let mut counts = [0usize; 256];
        for m in v.iter() {
            counts[key_byte(m, pass)] += 1;
        }

        let mut sum = 0usize;
        for count in counts.iter_mut() {
            let c = *count;
            *count = sum;
            sum += c;
        }

        for m in v.iter() {
            let k = key_byte(m, pass);
            tmp[counts[k]] = *m;
            counts[k] += 1;
        }

        std::mem::swap(v, &mut tmp);
    }
}

/// Keeps only the first (longest) result at each offset. Requires sorted
/// input.
fn keep_longest_per_offset(v: &mut Vec<Match>) {
    let mut write = 0;
    for i in 0..v.len() {
        if write == 0 || v[i].offset != v[write - 1].offset {
            v[write] = v[i];
            write += 1;
        }
    }
    v.truncate(write);
}

/// Keeps a result only when it starts at or after the previously kept
/// result's end. Requires sorted input.
fn drop_overlapping(v: &mut Vec<Match>) {
    let mut write = 0;
    for i in 0..v.len() {
        if write == 0 || v[i].offset >= v[write - 1].end() {
            v[write] = v[i];
            write += 1;
        }
    }
    v.truncate(write);
}
