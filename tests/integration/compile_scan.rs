//! Compile-then-scan scenarios covering both engine tiers.

use litmatch::{CompileOptions, ScanOptions};

use crate::common::{assert_slices_consistent, matcher_for, tuples};

#[test]
fn long_patterns_in_order() {
    let (matcher, _dir) = matcher_for(b"hello\nworld\n", CompileOptions::default());
    let haystack = b"say hello world hellohello";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();

    assert_eq!(tuples(&matches), vec![(4, 5), (10, 5), (16, 5), (21, 5)]);
    assert_eq!(matches.as_slice()[0].bytes(haystack), b"hello");
    assert_eq!(matches.as_slice()[1].bytes(haystack), b"world");
    assert_slices_consistent(&matches, haystack);
}

#[test]
fn short_and_long_tiers_coexist() {
    let (matcher, _dir) = matcher_for(b"a\nab\nabc\nabcd\nabcde\n", CompileOptions::default());
    let haystack = b"xabcdeY";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();

    // Length descending, offset ascending; one result per tier and length.
    assert_eq!(
        tuples(&matches),
        vec![(1, 5), (1, 4), (1, 3), (1, 2), (1, 1)]
    );
    assert_eq!(matches.as_slice()[0].bytes(haystack), b"abcde");
    assert_eq!(matches.as_slice()[4].bytes(haystack), b"a");
}

#[test]
fn longest_only_with_no_overlap() {
    let (matcher, _dir) = matcher_for(b"a\nab\nabc\nabcd\nabcde\n", CompileOptions::default());
    let options = ScanOptions {
        longest_only: true,
        no_overlap: true,
        ..ScanOptions::default()
    };
    let matches = matcher.scan(b"xabcdeY", &options).unwrap();
    assert_eq!(tuples(&matches), vec![(1, 5)]);
}

#[test]
fn word_boundary_rejects_embedded_occurrences() {
    let (matcher, _dir) = matcher_for(b"cat\n", CompileOptions::default());
    let options = ScanOptions {
        word_boundary: true,
        ..ScanOptions::default()
    };
    let haystack = b"the cat catches cats";
    let matches = matcher.scan(haystack, &options).unwrap();
    assert_eq!(tuples(&matches), vec![(4, 3)]);
    assert_eq!(matches.as_slice()[0].bytes(haystack), b"cat");
}

#[test]
fn line_anchor_predicates() {
    let (matcher, _dir) = matcher_for(b"end\nstart\n", CompileOptions::default());
    let haystack = b"start of a line\nmiddle\nthe end";

    let starts = matcher
        .scan(
            haystack,
            &ScanOptions {
                line_start: true,
                ..ScanOptions::default()
            },
        )
        .unwrap();
    assert_eq!(tuples(&starts), vec![(0, 5)]);

    let ends = matcher
        .scan(
            haystack,
            &ScanOptions {
                line_end: true,
                ..ScanOptions::default()
            },
        )
        .unwrap();
    assert_eq!(tuples(&ends), vec![(27, 3)]);
    assert_eq!(ends.as_slice()[0].bytes(haystack), b"end");
}

#[test]
fn normalized_match_reports_original_coordinates() {
    let options = CompileOptions {
        case_fold: true,
        ignore_punct: true,
        elide_whitespace: true,
    };
    let (matcher, _dir) = matcher_for(b"Hello, World!\n", options);
    let haystack = b"Say: HELLO   world!!! please";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();

    assert_eq!(matches.len(), 1);
    let m = matches.as_slice()[0];
    // The match spans from the H through the d; skipped punctuation after
    // the last emitted byte is not part of the span.
    assert_eq!((m.offset, m.len), (5, 13));
    assert_eq!(m.bytes(haystack), b"HELLO   world");
}

#[test]
fn empty_haystack_yields_nothing() {
    let (matcher, _dir) = matcher_for(b"hello\nab\n", CompileOptions::default());
    let matches = matcher.scan(b"", &ScanOptions::default()).unwrap();
    assert!(matches.is_empty());
    assert_eq!(matches.stats().attempts, 0);
}

#[test]
fn pattern_past_end_is_not_matched() {
    let (matcher, _dir) = matcher_for(b"hello\n", CompileOptions::default());
    let matches = matcher.scan(b"hell", &ScanOptions::default()).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn absent_patterns_produce_no_results() {
    let (matcher, _dir) = matcher_for(b"needle\npin\n", CompileOptions::default());
    let matches = matcher
        .scan(b"a haystack with no such things", &ScanOptions::default())
        .unwrap();
    assert!(matches.is_empty());
}

#[test]
fn overlapping_dictionary_patterns_all_reported() {
    let (matcher, _dir) = matcher_for(b"ananas\nnana\nanas\n", CompileOptions::default());
    let haystack = b"bananas";
    let matches = matcher.scan(haystack, &ScanOptions::default()).unwrap();
    // "ananas" at 1, "nana" at 2, "anas" at 3.
    assert_eq!(tuples(&matches), vec![(1, 6), (2, 4), (3, 4)]);
}

#[test]
fn scan_stats_track_the_hot_path() {
    let (matcher, _dir) = matcher_for(b"hello\n", CompileOptions::default());
    let matches = matcher
        .scan(b"hello hello", &ScanOptions::default())
        .unwrap();
    let stats = matches.stats();
    assert_eq!(matches.len(), 2);
    assert_eq!(stats.hits, 2);
    // Every position with 4+ bytes remaining forms a gram.
    assert_eq!(stats.attempts, 8);
    assert!(stats.comparisons >= 2);
}

#[test]
fn single_byte_dictionary() {
    let (matcher, _dir) = matcher_for(b"x\n", CompileOptions::default());
    let matches = matcher.scan(b"axbxc", &ScanOptions::default()).unwrap();
    assert_eq!(tuples(&matches), vec![(1, 1), (3, 1)]);
}
