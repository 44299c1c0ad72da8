//! Loader and read-only matcher handle.
//!
//! A matcher owns one read-only mapping of a compiled store plus the
//! decoded header and section layout. All scan state lives on the stack of
//! the scan call; the handle itself is immutable and safely shared across
//! threads for any number of concurrent scans.
//!
//! `open` also accepts a raw dictionary file: the dictionary is compiled to
//! a temporary artifact first, and that temporary is removed when the
//! matcher is dropped.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memmap2::Mmap;
use tempfile::{NamedTempFile, TempPath};

use crate::bloom::BloomView;
use crate::bucket::BucketView;
use crate::compiler::CompileOptions;
use crate::dict;
use crate::error::{FormatError, OpenError, ScanError};
use crate::format::{
    read_u32, SectionLayout, StoreHeader, BUCKET_ENTRY_LEN, BUCKET_PREFIX_LEN, EMPTY_SLOT,
    STORE_MAGIC,
};
use crate::results::{self, Matches};
use crate::scan::{self, Filters, ScanContext, ScanOptions};
use crate::short_matcher::ShortMatcherView;
use crate::transform::Transform;

const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Read-only handle over a compiled store.
pub struct Matcher {
    map: Mmap,
    header: StoreHeader,
    layout: SectionLayout,
    transform: Option<Transform>,
    _temp: Option<TempPath>,
}

impl Matcher {
    /// Opens `path`, compiling it on the fly when it is a raw dictionary
    /// rather than a compiled store.
    ///
    /// The on-the-fly path compiles with default (no-transform) options;
    /// use [`Matcher::open_with`] to normalize a raw dictionary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        Self::open_with(path, CompileOptions::default())
    }

    /// Like [`Matcher::open`], but a raw dictionary is compiled with
    /// `options`. An already-compiled store keeps its baked-in flags and
    /// `options` is ignored.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        options: CompileOptions,
    ) -> Result<Self, OpenError> {
        let path = path.as_ref();
        if is_compiled(path)? {
            return Self::open_compiled(path);
        }
        let temp = NamedTempFile::new()?.into_temp_path();
        dict::compile_dictionary_file(&temp, path, options)?;
        let mut matcher = Self::open_compiled(&temp)?;
        matcher._temp = Some(temp);
        Ok(matcher)
    }

    /// Opens an already-compiled store.
    pub fn open_compiled<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the store file is not
        // expected to change while a matcher holds it.
        let map = unsafe { Mmap::map(&file)? };

        let header = StoreHeader::decode(&map)?;
        let layout = SectionLayout::parse(&map, &header)?;
        validate_buckets(&map, &header, &layout)?;
        validate_short_keys(&map, &layout)?;

        let transform = header.has_transform().then(|| {
            Transform::new(
                header.case_fold(),
                header.ignore_punct(),
                header.elide_whitespace(),
            )
        });

        Ok(Self {
            map,
            header,
            layout,
            transform,
            _temp: None,
        })
    }

    /// Compiles a dictionary buffer to `artifact` and opens the result. The
    /// artifact persists after the matcher is dropped.
    pub fn from_dictionary<P: AsRef<Path>>(
        dictionary: &[u8],
        artifact: P,
        options: CompileOptions,
    ) -> Result<Self, OpenError> {
        let artifact = artifact.as_ref();
        dict::compile_dictionary(artifact, dictionary, options)?;
        Self::open_compiled(artifact)
    }

    /// The decoded global header (counts, sizes, derived statistics).
    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// Scans `haystack`, returning every match that satisfies the
    /// predicates in `options`, ordered by length descending then offset
    /// ascending.
    pub fn scan(&self, haystack: &[u8], options: &ScanOptions) -> Result<Matches, ScanError> {
        let threads = resolve_threads(options.threads)?;
        let chunk_size = resolve_chunk_size(options.chunk_size)?;
        let filters = Filters::from(options);
        let ctx = self.context();

        let (matches, stats) = match &self.transform {
            Some(transform) => crate::normalize::run(
                &ctx,
                transform,
                self.header.needs_backmap(),
                haystack,
                filters,
                threads,
                chunk_size,
            ),
            None => scan::run(&ctx, haystack, filters, threads, chunk_size),
        };

        Ok(results::finalize(
            matches,
            options.longest_only,
            options.no_overlap,
            stats,
        ))
    }

    fn context(&self) -> ScanContext<'_> {
        let data: &[u8] = &self.map;
        ScanContext {
            smallest: self.header.smallest_pattern_len,
            largest: self.header.largest_pattern_len,
            pattern_store: &data[self.layout.pattern_store.clone()],
            bloom: BloomView::new(self.layout.bloom_bit_size, &data[self.layout.bloom_bits.clone()]),
            index: &data[self.layout.index.clone()],
            table_mask: self.header.table_size - 1,
            bucket_data: &data[self.layout.bucket_data.clone()],
            short: self
                .layout
                .short
                .as_ref()
                .map(|short| ShortMatcherView::from_layout(data, short)),
        }
    }
}

/// Sniffs the global magic without mapping the file.
///
/// A file too short to hold the magic is reported as not compiled, matching
/// how raw dictionaries are detected.
pub fn is_compiled<P: AsRef<Path>>(path: P) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; STORE_MAGIC.len()];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => return Ok(false),
            n => filled += n,
        }
    }
    Ok(magic == STORE_MAGIC)
}

fn resolve_threads(requested: usize) -> Result<usize, ScanError> {
    let max = num_cpus::get().max(1);
    match requested {
        0 => Ok(max),
        n if n <= max => Ok(n),
        n => Err(ScanError::InvalidThreadCount { requested: n, max }),
    }
}

fn resolve_chunk_size(requested: usize) -> Result<usize, ScanError> {
    if requested == 0 {
        return Ok(DEFAULT_CHUNK_SIZE);
    }
    requested
        .checked_next_power_of_two()
        .ok_or(ScanError::InvalidChunkSize { requested })
}

/// Checks every index slot and bucket record against its region bounds so
/// the scan path can walk records without per-access checks.
fn validate_buckets(
    data: &[u8],
    header: &StoreHeader,
    layout: &SectionLayout,
) -> Result<(), FormatError> {
    let index = &data[layout.index.clone()];
    let bucket_data = &data[layout.bucket_data.clone()];
    let bucket_len = bucket_data.len() as u64;
    let store_len = header.pattern_store_size;

    let mut occupied = 0u32;
    for slot_idx in 0..header.table_size {
        let slot = read_u32(index, slot_idx as usize * 4);
        if slot == EMPTY_SLOT {
            continue;
        }
        occupied += 1;
        let at = u64::from(slot);
        if at + BUCKET_PREFIX_LEN as u64 > bucket_len {
            return Err(FormatError::CorruptBucket { slot: slot_idx });
        }
        let count = read_u32(bucket_data, at as usize + 4);
        let entries_end = at
            + BUCKET_PREFIX_LEN as u64
            + u64::from(count) * BUCKET_ENTRY_LEN as u64;
        if count == 0 || entries_end > bucket_len {
            return Err(FormatError::CorruptBucket { slot: slot_idx });
        }
        for entry in BucketView::at(bucket_data, slot).patterns() {
            let in_store = entry
                .offset
                .checked_add(u64::from(entry.len))
                .is_some_and(|end| end <= store_len);
            if entry.len == 0 || !in_store {
                return Err(FormatError::CorruptBucket { slot: slot_idx });
            }
        }
    }

    if occupied != header.occupied_buckets {
        return Err(FormatError::SizeMismatch {
            section: "hash index",
            stored: u64::from(header.occupied_buckets),
            actual: u64::from(occupied),
        });
    }
    Ok(())
}

/// Binary search requires the short-matcher key arrays to be strictly
/// ascending; verify once at load.
fn validate_short_keys(data: &[u8], layout: &SectionLayout) -> Result<(), FormatError> {
    let Some(short) = &layout.short else {
        return Ok(());
    };
    for (len, range, count) in [
        (3u32, short.arr3.clone(), short.len3),
        (4u32, short.arr4.clone(), short.len4),
    ] {
        let arr = &data[range];
        let mut prev = None;
        for i in 0..count {
            let key = read_u32(arr, i as usize * 4);
            if let Some(p) = prev {
                if key <= p {
                    return Err(FormatError::UnsortedShortKeys { len });
                }
            }
            prev = Some(key);
        }
    }
    Ok(())
}
