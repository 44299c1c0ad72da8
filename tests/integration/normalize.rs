//! Normalized scanning: case folding, punctuation, whitespace, windowing.

use litmatch::{CompileOptions, ScanOptions};

use crate::common::{matcher_for, tuples};

#[test]
fn case_fold_matches_any_spelling() {
    let options = CompileOptions {
        case_fold: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"Rust\n", options);
    let haystack = b"rust RUST rUsT";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&matches), vec![(0, 4), (5, 4), (10, 4)]);
    // Reported bytes come from the original haystack, not the normalized
    // copy.
    assert_eq!(matches.as_slice()[2].bytes(haystack), b"rUsT");
}

#[test]
fn punctuation_stripping_spans_the_original_bytes() {
    let options = CompileOptions {
        ignore_punct: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"email\n", options);
    let haystack = b"an e.m.a.i.l address";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();
    assert_eq!(matches.len(), 1);
    let m = matches.as_slice()[0];
    assert_eq!((m.offset, m.len), (3, 9));
    assert_eq!(m.bytes(haystack), b"e.m.a.i.l");
}

#[test]
fn whitespace_runs_collapse_for_matching() {
    let options = CompileOptions {
        elide_whitespace: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"two words\n", options);
    let haystack = b"two \t  words";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();
    assert_eq!(matches.len(), 1);
    let m = matches.as_slice()[0];
    assert_eq!(m.offset, 0);
    assert_eq!(m.bytes(haystack), b"two \t  words");
}

#[test]
fn normalized_and_raw_dictionaries_dedupe_consistently() {
    let options = CompileOptions {
        case_fold: true,
        ..CompileOptions::default()
    };
    // Both lines normalize to "HELLO"; only one pattern is stored.
    let (matcher, _dir) = matcher_for(b"Hello\nHELLO\n", options);
    assert_eq!(matcher.header().stored_pattern_count, 1);
    let matches = matcher.scan(b"hello hello", &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&matches), vec![(0, 5), (6, 5)]);
}

#[test]
fn short_patterns_normalize_too() {
    let options = CompileOptions {
        case_fold: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"ab\n", options);
    let matches = matcher.scan(b"AB ab Ab", &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&matches), vec![(0, 2), (3, 2), (6, 2)]);
}

#[test]
fn matches_cross_window_boundaries() {
    // Windows are 4 MiB; plant an occurrence straddling the first boundary
    // so only the reserved overlap can complete it.
    const WINDOW: usize = 4 * 1024 * 1024;
    let options = CompileOptions {
        case_fold: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"needle\n", options);

    let mut haystack = vec![b'x'; WINDOW + 64];
    let straddle = WINDOW - 3;
    haystack[straddle..straddle + 6].copy_from_slice(b"NeEdLe");
    let inside_second = WINDOW + 20;
    haystack[inside_second..inside_second + 6].copy_from_slice(b"needle");

    let matches = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
    assert_eq!(
        tuples(&matches),
        vec![(straddle as u64, 6), (inside_second as u64, 6)]
    );
}

#[test]
fn window_boundary_produces_no_duplicates() {
    // An occurrence placed entirely inside the overlap region must be
    // reported exactly once (owned by the second window).
    const WINDOW: usize = 4 * 1024 * 1024;
    let options = CompileOptions {
        case_fold: true,
        ..CompileOptions::default()
    };
    let (matcher, _dir) = matcher_for(b"needle\n", options);

    let mut haystack = vec![b'x'; WINDOW + 64];
    let at = WINDOW + 1;
    haystack[at..at + 6].copy_from_slice(b"needle");

    let matches = matcher.scan(&haystack, &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&matches), vec![(at as u64, 6)]);
}

#[test]
fn full_normalization_end_to_end() {
    let options = CompileOptions {
        case_fold: true,
        ignore_punct: true,
        elide_whitespace: true,
    };
    let (matcher, _dir) = matcher_for(b"rock and roll\n", options);
    let haystack = b"Rock and ... Roll forever; ROCK  AND  ROLL";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();
    assert_eq!(matches.len(), 2);
    // Skipped punctuation inside a whitespace run does not break the run.
    let first = matches.as_slice()[0];
    let second = matches.as_slice()[1];
    assert_eq!((first.offset, first.len), (0, 17));
    assert_eq!(first.bytes(haystack), b"Rock and ... Roll");
    assert_eq!((second.offset, second.len), (27, 15));
    assert_eq!(second.bytes(haystack), b"ROCK  AND  ROLL");
}
