//! Error types for compiling, loading, and scanning.
//!
//! Errors are stage-specific rather than one monolithic enum: a compile
//! failure, a malformed store, and a bad scan configuration have different
//! audiences and different recovery stories. All enums are
//! `#[non_exhaustive]`; consumers should include a fallback match arm.
//!
//! Duplicate patterns are never errors. They are counted in
//! [`CompileStats`](crate::CompileStats) and silently discarded.

use std::fmt;
use std::io;

/// Errors from building a compiled store.
#[derive(Debug)]
#[non_exhaustive]
pub enum CompileError {
    /// A pattern was empty, or normalized to zero bytes.
    EmptyPattern,
    /// I/O failure writing the artifact.
    Io(io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => write!(f, "pattern is empty after normalization"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Structural errors detected while decoding a compiled store.
///
/// Any of these means the bytes on disk are not a store this version can
/// consume; none of them are recoverable short of recompiling.
#[derive(Debug)]
#[non_exhaustive]
pub enum FormatError {
    /// A section magic did not match.
    BadMagic { section: &'static str },
    /// The store was produced by an unsupported format version.
    UnsupportedVersion { version: u32 },
    /// The buffer ended before a section was complete.
    Truncated {
        section: &'static str,
        need: u64,
        have: u64,
    },
    /// A field that must be a power of two was not.
    NotPowerOfTwo { field: &'static str, value: u64 },
    /// A stored size disagrees with the actual section contents.
    SizeMismatch {
        section: &'static str,
        stored: u64,
        actual: u64,
    },
    /// The file continues past the last section.
    TrailingBytes { extra: u64 },
    /// A bucket or pattern reference points outside its region.
    CorruptBucket { slot: u32 },
    /// A short-matcher key array is not strictly ascending.
    UnsortedShortKeys { len: u32 },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic { section } => write!(f, "bad magic in {section} section"),
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported format version {version}")
            }
            Self::Truncated {
                section,
                need,
                have,
            } => write!(
                f,
                "truncated {section} section: need {need} bytes, have {have}"
            ),
            Self::NotPowerOfTwo { field, value } => {
                write!(f, "{field} must be a power of two, got {value}")
            }
            Self::SizeMismatch {
                section,
                stored,
                actual,
            } => write!(
                f,
                "{section} size mismatch: header says {stored}, found {actual}"
            ),
            Self::TrailingBytes { extra } => {
                write!(f, "{extra} trailing bytes after the last section")
            }
            Self::CorruptBucket { slot } => {
                write!(f, "bucket record at index slot {slot} is out of range")
            }
            Self::UnsortedShortKeys { len } => {
                write!(f, "short-matcher length-{len} key array is not sorted")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Errors from opening a matcher.
#[derive(Debug)]
#[non_exhaustive]
pub enum OpenError {
    /// The store bytes failed structural validation.
    Format(FormatError),
    /// On-the-fly compilation of a raw dictionary failed.
    Compile(CompileError),
    /// I/O failure opening or mapping the file.
    Io(io::Error),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(err) => write!(f, "invalid compiled store: {err}"),
            Self::Compile(err) => write!(f, "dictionary compilation failed: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            Self::Compile(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<FormatError> for OpenError {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

impl From<CompileError> for OpenError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl From<io::Error> for OpenError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Errors from an invalid scan configuration.
#[derive(Debug)]
#[non_exhaustive]
pub enum ScanError {
    /// Requested thread count exceeds the host's hardware parallelism.
    InvalidThreadCount { requested: usize, max: usize },
    /// Requested chunk size cannot be rounded to a power of two.
    InvalidChunkSize { requested: usize },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreadCount { requested, max } => {
                write!(f, "thread count {requested} out of range [1, {max}]")
            }
            Self::InvalidChunkSize { requested } => {
                write!(f, "invalid chunk size {requested}")
            }
        }
    }
}

impl std::error::Error for ScanError {}
