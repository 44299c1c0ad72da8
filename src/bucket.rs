//! Gram-keyed bucket table: build-time Robin-Hood map and scan-time probe.
//!
//! At build time each occupied slot owns a growable list of pattern
//! references; patterns sharing a leading 4-byte gram share a bucket. At
//! serialize time the table flattens into a fixed index array (slot ->
//! bucket-data offset, or the empty sentinel) plus a packed bucket-data
//! region. At scan time nothing allocates: the probe walks the index array
//! and bucket records directly over the mapped bytes.

use crate::format::{read_u32, read_u64, BUCKET_ENTRY_LEN, BUCKET_PREFIX_LEN, EMPTY_SLOT};
use crate::hash::mix_key;

const INITIAL_TABLE_SIZE: usize = 8192;
const LOAD_FACTOR: f64 = 0.9;

/// Reference to a stored pattern: offset into the pattern store plus length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternRef {
    pub offset: u64,
    pub len: u32,
}

struct BucketSlot {
    key: u32,
    dist: u32,
    patterns: Vec<PatternRef>,
}

/// Build-time bucket table.
pub struct BucketTable {
    slots: Vec<Option<BucketSlot>>,
    used: u32,
    mask: usize,
}

impl BucketTable {
    pub fn new() -> Self {
        Self {
            slots: (0..INITIAL_TABLE_SIZE).map(|_| None).collect(),
            used: 0,
            mask: INITIAL_TABLE_SIZE - 1,
        }
    }

    /// Number of slots (always a power of two).
    pub fn table_size(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of occupied buckets.
    pub fn occupied(&self) -> u32 {
        self.used
    }

    /// Adds a pattern reference under its gram key, appending to an existing
    /// bucket when the key is already present.
    pub fn insert(&mut self, key: u32, offset: u64, len: u32) {
        if (self.used + 1) as f64 / self.slots.len() as f64 > LOAD_FACTOR {
            self.grow();
        }

        // Append path: the key may already own a bucket.
        let mut pos = mix_key(key) as usize & self.mask;
        loop {
            match &mut self.slots[pos] {
                None => break,
                Some(slot) if slot.key == key => {
                    slot.patterns.push(PatternRef { offset, len });
                    return;
                }
                Some(_) => {}
            }
            pos = (pos + 1) & self.mask;
        }

        self.place(BucketSlot {
            key,
            dist: 0,
            patterns: vec![PatternRef { offset, len }],
        });
        self.used += 1;
    }

    fn place(&mut self, mut entry: BucketSlot) {
        let mut pos = mix_key(entry.key) as usize & self.mask;
        let mut dist = 0u32;
        loop {
            let slot = &mut self.slots[pos];
            match slot {
                None => {
                    entry.dist = dist;
                    *slot = Some(entry);
                    return;
                }
                Some(resident) => {
                    if resident.dist < dist {
                        entry.dist = dist;
                        std::mem::swap(resident, &mut entry);
                        dist = entry.dist;
                    }
                }
            }
            dist += 1;
            pos = (pos + 1) & self.mask;
        }
    }

    fn grow(&mut self) {
        let old = std::mem::take(&mut self.slots);
        let new_cap = old.len() << 1;
        self.slots = (0..new_cap).map(|_| None).collect();
        self.mask = new_cap - 1;
        for slot in old.into_iter().flatten() {
            self.place(slot);
        }
    }

    /// Sorts every bucket's pattern list by descending length.
    ///
    /// The sort is stable, so equal-length patterns keep insertion order;
    /// the scan visits longer candidates first.
    pub fn sort_buckets(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.patterns.sort_by(|a, b| b.len.cmp(&a.len));
        }
    }

    /// Visits occupied slots in index order as `(slot_index, key, patterns)`.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, u32, &[PatternRef])> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s.key, s.patterns.as_slice())))
    }
}

/// Probes the serialized index array for `gram`.
///
/// Returns the bucket's byte offset within `bucket_data`, or `None` when no
/// bucket exists for the gram. Linear probing, bounded by the table size.
#[inline]
pub fn probe(index: &[u8], bucket_data: &[u8], mask: u32, gram: u32) -> Option<u32> {
    let mut idx = mix_key(gram) & mask;
    for _ in 0..=mask {
        let slot = read_u32(index, idx as usize * 4);
        if slot == EMPTY_SLOT {
            return None;
        }
        if read_u32(bucket_data, slot as usize) == gram {
            return Some(slot);
        }
        idx = (idx + 1) & mask;
    }
    None
}

/// Zero-copy view of one serialized bucket record.
#[derive(Clone, Copy)]
pub struct BucketView<'a> {
    record: &'a [u8],
}

impl<'a> BucketView<'a> {
    /// `bucket_data` sliced at a probe result. Record bounds are validated
    /// at load time.
    #[inline]
    pub fn at(bucket_data: &'a [u8], slot_offset: u32) -> Self {
        Self {
            record: &bucket_data[slot_offset as usize..],
        }
    }

    #[inline]
    pub fn key(&self) -> u32 {
        read_u32(self.record, 0)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        read_u32(self.record, 4)
    }

    /// Iterates pattern references in stored (length-descending) order.
    #[inline]
    pub fn patterns(&self) -> impl Iterator<Item = PatternRef> + 'a {
        let record = self.record;
        let count = self.count() as usize;
        (0..count).map(move |i| {
            let at = BUCKET_PREFIX_LEN + i * BUCKET_ENTRY_LEN;
            PatternRef {
                offset: read_u64(record, at),
                len: read_u32(record, at + 8),
            }
        })
    }
}
