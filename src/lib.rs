//! High-throughput multi-pattern literal matcher over a memory-mappable
//! compiled store.
//!
//! A dictionary of byte-string patterns compiles into a compact artifact;
//! opening that artifact yields a read-only [`Matcher`] that reports every
//! occurrence of every pattern in a haystack as `(offset, length)` records.
//!
//! The engine is two-tier:
//! - Patterns of length >= 5 go through a bloom pre-filter and a
//!   Robin-Hood-hashed bucket table keyed by the pattern's leading 4-byte
//!   gram, then an exact byte compare.
//! - Patterns of length 1-4 are answered by a specialized short matcher
//!   (bitmaps for lengths 1-2, sorted key arrays for lengths 3-4).
//!
//! Matching can run in a normalized space (ASCII case folding, punctuation
//! stripping, whitespace-run collapsing) chosen at compile time; reported
//! offsets always refer to the original haystack via back-mapping.
//!
//! Scans fan out over worker threads with a static chunk schedule and no
//! shared mutable state; final results are deterministically ordered by
//! length descending, then offset ascending.
//!
//! ```no_run
//! use litmatch::{compile_dictionary, CompileOptions, Matcher, ScanOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! compile_dictionary("words.olm", b"hello\nworld\n", CompileOptions::default())?;
//! let matcher = Matcher::open_compiled("words.olm")?;
//! let haystack = b"say hello world";
//! let matches = matcher.scan(haystack, &ScanOptions::default())?;
//! for m in &matches {
//!     println!("{} @ {}", String::from_utf8_lossy(m.bytes(haystack)), m.offset);
//! }
//! # Ok(())
//! # }
//! ```

mod bloom;
mod bucket;
mod classify;
mod compiler;
mod dedupe;
mod dict;
mod error;
mod format;
mod hash;
mod matcher;
mod normalize;
mod pattern_store;
mod results;
mod scan;
mod short_matcher;
mod stats;
mod transform;

pub use compiler::{CompileOptions, Compiler};
pub use dict::{compile_dictionary, compile_dictionary_file};
pub use error::{CompileError, FormatError, OpenError, ScanError};
pub use format::StoreHeader;
pub use matcher::{is_compiled, Matcher};
pub use results::{Match, Matches};
pub use scan::ScanOptions;
pub use stats::{CompileStats, ScanStats};
