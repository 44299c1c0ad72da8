//! Normalization transform with offset back-mapping.
//!
//! A 256-entry action table rewrites bytes into a canonical space: case
//! folding to uppercase, punctuation stripping, and whitespace-run
//! collapsing. The same table is applied to patterns at compile time and to
//! the haystack at scan time, so matching happens entirely in normalized
//! coordinates.
//!
//! When stripping or eliding is active, output positions no longer line up
//! with input positions; `apply_with_backmap` records, for every output
//! byte, the source index that produced it (a whitespace run maps to its
//! first byte). The scan wrapper uses that back-map to report matches in
//! original haystack coordinates.

use crate::classify::{is_punct, is_space};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Discard the byte.
    Skip,
    /// Emit one space for a run of whitespace bytes.
    ElideRun,
    /// Emit the byte (possibly case-folded).
    Emit(u8),
}

/// Pre-built byte rewriting table.
#[derive(Clone)]
pub struct Transform {
    table: [Action; 256],
}

impl Transform {
    pub fn new(case_fold: bool, ignore_punct: bool, elide_whitespace: bool) -> Self {
        let mut table = [Action::Skip; 256];
        for (i, action) in table.iter_mut().enumerate() {
            let b = i as u8;
            *action = if elide_whitespace && is_space(b) {
                Action::ElideRun
            } else if ignore_punct && is_punct(b) {
                Action::Skip
            } else if case_fold {
                Action::Emit(b.to_ascii_uppercase())
            } else {
                Action::Emit(b)
            };
        }
        Self { table }
    }

    /// Normalizes `src` into `dst` (cleared first).
    pub fn apply(&self, src: &[u8], dst: &mut Vec<u8>) {
        self.run::<false>(src, dst, &mut Vec::new());
    }

    /// Normalizes `src` into `dst`, recording the source index of every
    /// output byte in `backmap` (both cleared first).
    pub fn apply_with_backmap(&self, src: &[u8], dst: &mut Vec<u8>, backmap: &mut Vec<u32>) {
        self.run::<true>(src, dst, backmap);
    }

    fn run<const BACKMAP: bool>(&self, src: &[u8], dst: &mut Vec<u8>, backmap: &mut Vec<u32>) {
        dst.clear();
        dst.reserve(src.len());
        if BACKMAP {
            backmap.clear();
            backmap.reserve(src.len());
        }

        let mut in_space = false;
        for (i, &b) in src.iter().enumerate() {
            match self.table[usize::from(b)] {
                Action::Skip => {}
                Action::ElideRun => {
                    if !in_space {
                        dst.push(b' ');
                        if BACKMAP {
                            backmap.push(i as u32);
                        }
                        in_space = true;
                    }
                }
                Action::Emit(out) => {
                    dst.push(out);
                    if BACKMAP {
                        backmap.push(i as u32);
                    }
                    in_space = false;
                }
            }
        }

        // One trailing space (typically a collapsed run) is dropped.
        if dst.last() == Some(&b' ') {
            dst.pop();
            if BACKMAP {
                backmap.pop();
            }
        }
    }
}
