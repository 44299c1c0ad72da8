//! Append-only pattern store with deduplication.
//!
//! Patterns of length >= 5 are written straight into the artifact in
//! arrival order; the returned offset is relative to the start of the
//! pattern store region. Duplicates never reach the sink.

use std::io::{self, Write};

use crate::dedupe::DedupeSet;

pub struct PatternStore {
    dedupe: DedupeSet,
    written: u64,
}

impl PatternStore {
    pub fn new() -> Self {
        Self {
            dedupe: DedupeSet::new(),
            written: 0,
        }
    }

    /// Appends `pattern` to the sink if it has not been stored before.
    ///
    /// Returns the pattern's offset within the store region, or `None` for a
    /// duplicate (nothing is written).
    pub fn store<W: Write>(&mut self, w: &mut W, pattern: &[u8]) -> io::Result<Option<u64>> {
        if !self.dedupe.insert(pattern) {
            return Ok(None);
        }
        w.write_all(pattern)?;
        let offset = self.written;
        self.written += pattern.len() as u64;
        Ok(Some(offset))
    }

    /// Total bytes occupying the store region.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}
