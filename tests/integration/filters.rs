//! Predicate edge cases, especially absent neighbors at buffer edges.

use litmatch::{CompileOptions, ScanOptions};

use crate::common::{matcher_for, tuples};

fn options(f: impl FnOnce(&mut ScanOptions)) -> ScanOptions {
    let mut options = ScanOptions::default();
    f(&mut options);
    options
}

#[test]
fn word_prefix_requires_non_word_before() {
    let (matcher, _dir) = matcher_for(b"cat\n", CompileOptions::default());
    let haystack = b"cat concat cats";
    let matches = matcher
        .scan(haystack, &options(|o| o.word_prefix = true))
        .unwrap();
    // Rejects the occurrence inside "concat"; buffer start counts as
    // non-word.
    assert_eq!(tuples(&matches), vec![(0, 3), (11, 3)]);
}

#[test]
fn word_suffix_requires_non_word_after() {
    let (matcher, _dir) = matcher_for(b"cat\n", CompileOptions::default());
    let haystack = b"cat concat cats";
    let matches = matcher
        .scan(haystack, &options(|o| o.word_suffix = true))
        .unwrap();
    // Rejects "cats"; the occurrence ending before a space survives, as
    // does the embedded one in "concat" (its next byte is a space).
    assert_eq!(tuples(&matches), vec![(0, 3), (7, 3)]);
}

#[test]
fn word_suffix_accepts_buffer_end() {
    let (matcher, _dir) = matcher_for(b"end\n", CompileOptions::default());
    let matches = matcher
        .scan(b"the end", &options(|o| o.word_suffix = true))
        .unwrap();
    assert_eq!(tuples(&matches), vec![(4, 3)]);
}

#[test]
fn word_boundary_needs_a_wordness_transition() {
    let (matcher, _dir) = matcher_for(b"cat\n", CompileOptions::default());
    let matches = matcher
        .scan(b"xcat", &options(|o| o.word_boundary = true))
        .unwrap();
    assert!(matches.is_empty());

    let matches = matcher
        .scan(b"cat", &options(|o| o.word_boundary = true))
        .unwrap();
    assert_eq!(tuples(&matches), vec![(0, 3)]);
}

#[test]
fn word_boundary_applies_to_short_tier() {
    let (matcher, _dir) = matcher_for(b"at\n", CompileOptions::default());
    let matches = matcher
        .scan(b"at bat at'", &options(|o| o.word_boundary = true))
        .unwrap();
    // "bat" hides its occurrence (no transition); the apostrophe ends a
    // word, so the final occurrence passes.
    assert_eq!(tuples(&matches), vec![(0, 2), (7, 2)]);
}

#[test]
fn line_start_accepts_after_cr_and_lf() {
    let (matcher, _dir) = matcher_for(b"log\n", CompileOptions::default());
    let haystack = b"log\nlog\rlog log";
    let matches = matcher
        .scan(haystack, &options(|o| o.line_start = true))
        .unwrap();
    assert_eq!(tuples(&matches), vec![(0, 3), (4, 3), (8, 3)]);
}

#[test]
fn line_end_accepts_before_cr_lf_and_buffer_end() {
    let (matcher, _dir) = matcher_for(b"log\n", CompileOptions::default());
    let haystack = b"log\nlog\rxlog log";
    let matches = matcher
        .scan(haystack, &options(|o| o.line_end = true))
        .unwrap();
    assert_eq!(tuples(&matches), vec![(0, 3), (4, 3), (13, 3)]);
}

#[test]
fn line_anchors_compose_for_whole_line_matches() {
    let (matcher, _dir) = matcher_for(b"exact\n", CompileOptions::default());
    let haystack = b"exact\nnot exact here\nexact";
    let matches = matcher
        .scan(
            haystack,
            &options(|o| {
                o.line_start = true;
                o.line_end = true;
            }),
        )
        .unwrap();
    assert_eq!(tuples(&matches), vec![(0, 5), (21, 5)]);
}

#[test]
fn predicates_filter_the_short_tier_identically() {
    let (matcher, _dir) = matcher_for(b"id\n", CompileOptions::default());
    let haystack = b"id grid id\nid";
    let matches = matcher
        .scan(
            haystack,
            &options(|o| {
                o.word_prefix = true;
                o.word_suffix = true;
            }),
        )
        .unwrap();
    // "grid" is rejected by prefix; all standalone occurrences pass.
    assert_eq!(tuples(&matches), vec![(0, 2), (8, 2), (11, 2)]);
}
