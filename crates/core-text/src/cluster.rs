//! Grapheme cluster boundaries over UTF-16 content.
//!
//! `cluster_len` answers how many code units the user-perceived character
//! adjacent to an offset occupies. Boundaries follow extended grapheme cluster
//! rules, which keep the following indivisible:
//! - surrogate pairs (any code point above U+FFFF),
//! - ZWJ sequences, including multi-person family emoji,
//! - emoji base + variation selector (+ trailing ZWJ-joined glyph),
//! - regional indicator pairs (flags),
//! - keycaps (`0-9 # *` + U+FE0F + U+20E3),
//! - CRLF,
//! - a base character with its run of combining marks.
//!
//! Pure functions; no allocation beyond the transient UTF-8 mirror.

use crate::segment::Utf16Index;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the start of the content ("previous cluster").
    Backward,
    /// Toward the end of the content ("next cluster").
    Forward,
}

/// Code units of the cluster adjacent to `offset` in `direction`.
///
/// Returns 0 only when `offset` already sits at the content edge in that
/// direction. Offsets past the end are clamped.
pub fn cluster_len(units: &[u16], offset: usize, direction: Direction) -> usize {
    let offset = offset.min(units.len());
    match direction {
        Direction::Backward if offset == 0 => return 0,
        Direction::Forward if offset == units.len() => return 0,
        _ => {}
    }
    let index = Utf16Index::new(units);
    match direction {
        Direction::Backward => offset - index.prev_boundary(offset),
        Direction::Forward => index.next_boundary(offset) - offset,
    }
}

/// Offset reached after stepping over `count` clusters from `offset`.
pub fn step_clusters(units: &[u16], offset: usize, count: usize, direction: Direction) -> usize {
    let index = Utf16Index::new(units);
    let mut at = offset.min(units.len());
    for _ in 0..count {
        let next = match direction {
            Direction::Backward => index.prev_boundary(at),
            Direction::Forward => index.next_boundary(at),
        };
        if next == at {
            break;
        }
        at = next;
    }
    at
}

/// Nearest cluster boundary at or around `offset`: `Backward` snaps to the
/// start of the cluster containing `offset`, `Forward` to its end. Offsets
/// already on a boundary (including both content edges) are returned as is.
pub fn snap_to_cluster(units: &[u16], offset: usize, direction: Direction) -> usize {
    let offset = offset.min(units.len());
    let index = Utf16Index::new(units);
    if index.is_boundary(offset) {
        return offset;
    }
    match direction {
        Direction::Backward => index.prev_boundary(offset),
        Direction::Forward => index.next_boundary(offset),
    }
}

/// `[start, end)` widened so neither end splits a cluster. An empty range
/// stays empty, at the start of the cluster holding it.
pub fn expand_to_clusters(units: &[u16], start: usize, end: usize) -> (usize, usize) {
    let lo = snap_to_cluster(units, start, Direction::Backward);
    if start >= end {
        return (lo, lo);
    }
    (lo, snap_to_cluster(units, end, Direction::Forward))
}

/// Longest prefix of `text` that fits in `max_units` code units without
/// splitting a cluster.
pub fn truncate_to_units(text: &str, max_units: usize) -> &str {
    let mut used = 0usize;
    let mut end = 0usize;
    for (byte, g) in text.grapheme_indices(true) {
        let w = g.encode_utf16().count();
        if used + w > max_units {
            break;
        }
        used += w;
        end = byte + g.len();
    }
    &text[..end]
}

/// UTF-16 length of a string slice.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PIECES: [&str; 7] = [
        "a",
        "😀",
        "👨‍👩‍👦‍👦",
        "🇯🇵",
        "1\u{FE0F}\u{20E3}",
        "\r\n",
        "e\u{301}",
    ];

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn back_len(s: &str) -> usize {
        let u = utf16(s);
        cluster_len(&u, u.len(), Direction::Backward)
    }

    #[test]
    fn edges_are_zero_length() {
        let u = utf16("ab");
        assert_eq!(cluster_len(&u, 0, Direction::Backward), 0);
        assert_eq!(cluster_len(&u, 2, Direction::Forward), 0);
        assert_eq!(cluster_len(&[], 0, Direction::Forward), 0);
    }

    #[test]
    fn plain_and_surrogate() {
        assert_eq!(back_len("ab"), 1);
        assert_eq!(back_len("a😀"), 2);
        let u = utf16("😀b");
        assert_eq!(cluster_len(&u, 0, Direction::Forward), 2);
    }

    #[test]
    fn zwj_family_is_one_cluster() {
        let family = "👨‍👩‍👦‍👦";
        assert_eq!(utf16(family).len(), 11);
        assert_eq!(back_len(family), 11);
    }

    #[test]
    fn variation_selector_sequences() {
        assert_eq!(back_len("x❤️"), 2);
        // Flag with trailing ZWJ-joined glyph.
        let rainbow = "🏳️‍🌈";
        assert_eq!(back_len(rainbow), utf16(rainbow).len());
    }

    #[test]
    fn flags_pair_regional_indicators() {
        let two = "🇨🇳🇺🇸";
        let u = utf16(two);
        assert_eq!(cluster_len(&u, u.len(), Direction::Backward), 4);
        assert_eq!(cluster_len(&u, 0, Direction::Forward), 4);
    }

    #[test]
    fn keycap_sequence() {
        let k = "1\u{FE0F}\u{20E3}";
        assert_eq!(back_len(k), 3);
    }

    #[test]
    fn crlf_and_combining() {
        assert_eq!(back_len("a\r\n"), 2);
        assert_eq!(back_len("e\u{301}\u{302}"), 3);
    }

    #[test]
    fn offset_inside_pair_measures_to_the_pair_edges() {
        let u = utf16("a😀");
        assert_eq!(cluster_len(&u, 2, Direction::Backward), 1);
        assert_eq!(cluster_len(&u, 2, Direction::Forward), 1);
    }

    #[test]
    fn snapping_leaves_boundaries_alone() {
        let u = utf16("a😀b");
        for at in [0, 1, 3, 4] {
            assert_eq!(snap_to_cluster(&u, at, Direction::Backward), at);
            assert_eq!(snap_to_cluster(&u, at, Direction::Forward), at);
        }
        assert_eq!(snap_to_cluster(&u, 9, Direction::Backward), 4);
    }

    #[test]
    fn snapping_moves_out_of_pairs_and_sequences() {
        let u = utf16("a😀b");
        assert_eq!(snap_to_cluster(&u, 2, Direction::Backward), 1);
        assert_eq!(snap_to_cluster(&u, 2, Direction::Forward), 3);

        // Char boundary inside a ZWJ family is still inside the cluster.
        let u = utf16("x👨‍👩‍👦‍👦y");
        assert_eq!(snap_to_cluster(&u, 3, Direction::Backward), 1);
        assert_eq!(snap_to_cluster(&u, 3, Direction::Forward), 12);
        assert_eq!(expand_to_clusters(&u, 4, 6), (1, 12));
        assert_eq!(expand_to_clusters(&u, 4, 4), (1, 1));
    }

    #[test]
    fn step_counts_clusters() {
        let s = "👨‍👩‍👦‍👦".repeat(12);
        let u = utf16(&s);
        assert_eq!(step_clusters(&u, u.len(), 2, Direction::Backward), u.len() - 22);
        assert_eq!(step_clusters(&u, 0, 100, Direction::Forward), u.len());
    }

    #[test]
    fn truncate_never_splits() {
        assert_eq!(truncate_to_units("ab😀c", 3), "ab");
        assert_eq!(truncate_to_units("ab😀c", 4), "ab😀");
        assert_eq!(truncate_to_units("👨‍👩‍👦‍👦x", 10), "");
    }

    proptest! {
        #[test]
        fn backward_steps_count_every_cluster(
            picks in proptest::collection::vec(0usize..PIECES.len(), 0..24)
        ) {
            let text: String = picks.iter().map(|i| PIECES[*i]).collect();
            let u = utf16(&text);
            let mut at = u.len();
            let mut clusters = 0;
            while at > 0 {
                let len = cluster_len(&u, at, Direction::Backward);
                prop_assert!(len > 0);
                at -= len;
                clusters += 1;
            }
            prop_assert_eq!(clusters, picks.len());
        }
    }
}
