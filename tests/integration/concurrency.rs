//! Determinism across thread counts and chunk sizes, and config validation.

use litmatch::{CompileOptions, ScanError, ScanOptions};

use crate::common::{matcher_for, tuples};

/// Pseudo-random haystack over a tiny alphabet so matches are dense.
fn dense_haystack(len: usize) -> Vec<u8> {
    let alphabet = b"abcde ";
    let mut state = 0x243f_6a88_85a3_08d3u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            alphabet[(state % alphabet.len() as u64) as usize]
        })
        .collect()
}

const DICTIONARY: &[u8] = b"a\nab\nabc\nabcd\nabcde\ncab\nbead\ndecade\ne a\n";

#[test]
fn results_are_identical_for_every_thread_count() {
    let (matcher, _dir) = matcher_for(DICTIONARY, CompileOptions::default());
    let haystack = dense_haystack(200_000);

    let baseline = matcher
        .scan(
            &haystack,
            &ScanOptions {
                threads: 1,
                ..ScanOptions::default()
            },
        )
        .unwrap();
    assert!(!baseline.is_empty(), "dense haystack must produce matches");

    let max = num_cpus::get();
    for threads in 2..=max.min(8) {
        let run = matcher
            .scan(
                &haystack,
                &ScanOptions {
                    threads,
                    ..ScanOptions::default()
                },
            )
            .unwrap();
        assert_eq!(
            tuples(&run),
            tuples(&baseline),
            "thread count {threads} diverged"
        );
    }

    // 0 selects the hardware maximum.
    let auto = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&auto), tuples(&baseline));
}

#[test]
fn results_are_identical_for_every_chunk_size() {
    let (matcher, _dir) = matcher_for(DICTIONARY, CompileOptions::default());
    let haystack = dense_haystack(50_000);

    let baseline = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
    for chunk_size in [1usize, 7, 64, 4096, 1 << 20] {
        let run = matcher
            .scan(
                &haystack,
                &ScanOptions {
                    chunk_size,
                    ..ScanOptions::default()
                },
            )
            .unwrap();
        assert_eq!(
            tuples(&run),
            tuples(&baseline),
            "chunk size {chunk_size} diverged"
        );
    }
}

#[test]
fn stats_reduce_identically_across_schedules() {
    let (matcher, _dir) = matcher_for(DICTIONARY, CompileOptions::default());
    let haystack = dense_haystack(50_000);

    let one = matcher
        .scan(
            &haystack,
            &ScanOptions {
                threads: 1,
                ..ScanOptions::default()
            },
        )
        .unwrap();
    let many = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
    // Static schedule visits the same positions regardless of workers.
    assert_eq!(one.stats(), many.stats());
}

#[test]
fn thread_count_above_hardware_max_is_rejected() {
    let (matcher, _dir) = matcher_for(DICTIONARY, CompileOptions::default());
    let requested = num_cpus::get() + 1;
    let result = matcher.scan(
        b"abcde",
        &ScanOptions {
            threads: requested,
            ..ScanOptions::default()
        },
    );
    assert!(matches!(
        result,
        Err(ScanError::InvalidThreadCount { .. })
    ));
}

#[test]
fn concurrent_scans_share_one_matcher() {
    let (matcher, _dir) = matcher_for(DICTIONARY, CompileOptions::default());
    let haystack = dense_haystack(20_000);
    let baseline = tuples(&matcher.scan(&haystack, &ScanOptions::default()).unwrap());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let run = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
                assert_eq!(tuples(&run), baseline);
            });
        }
    });
}
