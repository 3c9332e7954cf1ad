//! Caret and selection state.
//!
//! The selection is stored as `(anchor, caret)`: `anchor` is the fixed end
//! while extending, `caret` the moving end. `range()` normalizes the pair to
//! `start <= end`; `anchor == caret` means no selection.
//!
//! Rules:
//! * Every entry point clamps offsets to `[0, len]`; nothing here fails.
//! * Caller-supplied offsets (`set_selection`, `set_caret_position`) are
//!   snapped to grapheme cluster boundaries, so the caret never rests inside
//!   a surrogate pair or an emoji sequence.
//! * A plain left/right move with an active range collapses to the nearer
//!   boundary (left -> start, right -> end) instead of stepping a cluster.
//! * Movement on empty content is a successful no-op (`true`). Movement that
//!   cannot proceed at a content edge reports `false`.
//! * Word and line stops come from the `TextLayout` oracle; paragraph stops
//!   are `\n` positions in the content itself.

use core_model::{Affinity, TextLayout};
use core_text::{
    Buffer, Direction, EditResult, TextRange, cluster_len, expand_to_clusters, snap_to_cluster,
};
use tracing::trace;

const NL: u16 = b'\n' as u16;
const CR: u16 = b'\r' as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionController {
    anchor: usize,
    caret: usize,
    affinity: Affinity,
}

fn is_blank(units: &[u16], start: usize, end: usize) -> bool {
    start < end
        && String::from_utf16_lossy(&units[start..end])
            .chars()
            .all(char::is_whitespace)
}

fn paragraph_start(units: &[u16], at: usize) -> usize {
    units[..at].iter().rposition(|u| *u == NL).map_or(0, |i| i + 1)
}

fn paragraph_end(units: &[u16], at: usize) -> usize {
    let end = units[at..]
        .iter()
        .position(|u| *u == NL)
        .map_or(units.len(), |i| at + i);
    if end > at && units[end - 1] == CR && end < units.len() {
        end - 1
    } else {
        end
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.anchor, self.caret)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.caret
    }

    /// Collapse to `index` (clamped).
    pub fn move_caret(&mut self, index: usize, affinity: Affinity, len: usize) {
        let index = index.min(len);
        self.anchor = index;
        self.caret = index;
        self.affinity = affinity;
        trace!(target: "state.selection", op = "move_caret", caret = index, ?affinity);
    }

    /// Collapse to `index`, snapped down to a cluster start.
    pub fn set_caret_position(&mut self, index: usize, units: &[u16]) {
        let index = snap_to_cluster(units, index, Direction::Backward);
        self.move_caret(index, Affinity::Downstream, units.len());
    }

    /// Select from `anchor` to `index`. Equal ends collapse.
    pub fn extend_selection(&mut self, anchor: usize, index: usize, len: usize) {
        self.anchor = anchor.min(len);
        self.caret = index.min(len);
        self.affinity = if self.caret >= self.anchor {
            Affinity::Upstream
        } else {
            Affinity::Downstream
        };
        trace!(target: "state.selection", op = "extend", anchor = self.anchor, caret = self.caret);
    }

    /// Explicit selection request. `start` becomes the anchor, `end` the caret.
    /// Ends inside a cluster move outward; a collapsed request inside a
    /// cluster lands on its start.
    pub fn set_selection(&mut self, start: usize, end: usize, units: &[u16]) {
        let len = units.len();
        let (start, end) = (start.min(len), end.min(len));
        let (lo, hi) = expand_to_clusters(units, start.min(end), start.max(end));
        let (anchor, caret) = match start.cmp(&end) {
            std::cmp::Ordering::Equal => (lo, lo),
            std::cmp::Ordering::Less => (lo, hi),
            std::cmp::Ordering::Greater => (hi, lo),
        };
        self.extend_selection(anchor, caret, len);
    }

    pub fn select_all(&mut self, len: usize) {
        self.extend_selection(0, len, len);
    }

    /// Re-validate after the content changed length.
    pub fn clamp_to(&mut self, len: usize) {
        if self.anchor > len || self.caret > len {
            self.anchor = self.anchor.min(len);
            self.caret = self.caret.min(len);
            trace!(target: "state.selection", op = "clamp", len);
        }
    }

    /// Remove the selected range from `buffer` and collapse to its start.
    /// Returns the removed text, or `None` without a selection.
    pub fn delete_selection(&mut self, buffer: &mut Buffer) -> EditResult<Option<String>> {
        if !self.has_selection() {
            return Ok(None);
        }
        let r = self.range();
        let removed = buffer.delete_range(r.start, r.end)?;
        self.move_caret(r.start, Affinity::Downstream, buffer.len_utf16());
        Ok(Some(removed))
    }

    // ---------------------------------------------------------------------------------------------
    // Cluster moves
    // ---------------------------------------------------------------------------------------------

    pub fn move_left(&mut self, units: &[u16]) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        if self.has_selection() {
            self.move_caret(self.range().start, Affinity::Downstream, len);
            return true;
        }
        let step = cluster_len(units, self.caret, Direction::Backward);
        if step == 0 {
            return false;
        }
        self.move_caret(self.caret - step, Affinity::Downstream, len);
        true
    }

    pub fn move_right(&mut self, units: &[u16]) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        if self.has_selection() {
            self.move_caret(self.range().end, Affinity::Upstream, len);
            return true;
        }
        let step = cluster_len(units, self.caret, Direction::Forward);
        if step == 0 {
            return false;
        }
        self.move_caret(self.caret + step, Affinity::Upstream, len);
        true
    }

    /// Grow or shrink the selection one cluster to the left of the caret.
    pub fn handle_select_left(&mut self, units: &[u16]) -> bool {
        if units.is_empty() {
            return true;
        }
        let step = cluster_len(units, self.caret, Direction::Backward);
        if step == 0 {
            return false;
        }
        self.extend_selection(self.anchor, self.caret - step, units.len());
        true
    }

    pub fn handle_select_right(&mut self, units: &[u16]) -> bool {
        if units.is_empty() {
            return true;
        }
        let step = cluster_len(units, self.caret, Direction::Forward);
        if step == 0 {
            return false;
        }
        self.extend_selection(self.anchor, self.caret + step, units.len());
        true
    }

    // ---------------------------------------------------------------------------------------------
    // Oracle-driven moves
    // ---------------------------------------------------------------------------------------------

    fn finish_move(&mut self, target: usize, affinity: Affinity, len: usize) -> bool {
        let moved = target != self.caret || self.has_selection();
        self.move_caret(target, affinity, len);
        moved
    }

    /// Start of the previous word, skipping a whitespace run.
    pub fn move_left_word<L: TextLayout + ?Sized>(&mut self, units: &[u16], layout: &L) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        let from = self.range().start;
        if from == 0 {
            return self.finish_move(0, Affinity::Downstream, len);
        }
        let (mut start, _) = layout.word_boundary(from - 1);
        if is_blank(units, start, from) && start > 0 {
            start = layout.word_boundary(start - 1).0;
        }
        self.finish_move(start.min(from - 1), Affinity::Downstream, len)
    }

    /// End of the next word, skipping a whitespace run.
    pub fn move_right_word<L: TextLayout + ?Sized>(&mut self, units: &[u16], layout: &L) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        let from = self.range().end;
        if from == len {
            return self.finish_move(len, Affinity::Upstream, len);
        }
        let (_, mut end) = layout.word_boundary(from);
        if is_blank(units, from, end) && end < len {
            end = layout.word_boundary(end).1;
        }
        self.finish_move(end.max(from + 1), Affinity::Upstream, len)
    }

    // Visual line holding the caret; an upstream caret at a soft wrap belongs
    // to the line it ends.
    fn caret_line<L: TextLayout + ?Sized>(&self, units: &[u16], layout: &L) -> (usize, usize) {
        let at = self.caret;
        if self.affinity == Affinity::Upstream && at > 0 && units[at - 1] != NL {
            let prev = at - cluster_len(units, at, Direction::Backward);
            return layout.line_boundary(prev);
        }
        layout.line_boundary(at)
    }

    pub fn move_line_begin<L: TextLayout + ?Sized>(&mut self, units: &[u16], layout: &L) -> bool {
        if units.is_empty() {
            return true;
        }
        let (start, _) = self.caret_line(units, layout);
        self.finish_move(start, Affinity::Downstream, units.len())
    }

    pub fn move_line_end<L: TextLayout + ?Sized>(&mut self, units: &[u16], layout: &L) -> bool {
        if units.is_empty() {
            return true;
        }
        let (_, end) = self.caret_line(units, layout);
        self.finish_move(end, Affinity::Upstream, units.len())
    }

    pub fn move_paragraph_begin(&mut self, units: &[u16]) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        let from = self.range().start;
        let mut target = paragraph_start(units, from);
        if target == from && from > 0 {
            target = paragraph_start(units, from - 1);
        }
        self.finish_move(target, Affinity::Downstream, len)
    }

    pub fn move_paragraph_end(&mut self, units: &[u16]) -> bool {
        let len = units.len();
        if len == 0 {
            return true;
        }
        let from = self.range().end;
        let mut target = paragraph_end(units, from);
        if target <= from && from < len {
            target = paragraph_end(units, (from + 1).min(len));
        }
        self.finish_move(target, Affinity::Upstream, len)
    }

    /// Select the word (or whitespace run) containing `offset`.
    pub fn select_word_at<L: TextLayout + ?Sized>(
        &mut self,
        offset: usize,
        len: usize,
        layout: &L,
    ) {
        let (start, end) = layout.word_boundary(offset.min(len));
        self.extend_selection(start, end, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::FixedAdvanceLayout;
    use core_text::ContentPolicy;
    use pretty_assertions::assert_eq;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn layout(text: &str, width: f32) -> FixedAdvanceLayout {
        let mut l = FixedAdvanceLayout::new(10.0, 20.0);
        l.layout(text, width);
        l
    }

    #[test]
    fn left_at_zero_reports_no_movement() {
        let u = utf16("abc");
        let mut s = SelectionController::new();
        assert!(!s.move_left(&u));
        assert_eq!(s.caret(), 0);
        assert!(s.move_left(&[]));
    }

    #[test]
    fn directional_move_collapses_selection() {
        let u = utf16("0123456789abc");
        let mut s = SelectionController::new();
        s.set_selection(5, 10, &u);
        assert!(s.move_left(&u));
        assert_eq!(s.caret(), 5);
        s.set_selection(5, 10, &u);
        assert!(s.move_right(&u));
        assert_eq!(s.caret(), 10);
        assert!(!s.has_selection());
    }

    #[test]
    fn moves_step_whole_clusters_and_set_affinity() {
        let u = utf16("a👨‍👩‍👦‍👦b");
        let mut s = SelectionController::new();
        s.move_caret(1, Affinity::Downstream, u.len());
        assert!(s.move_right(&u));
        assert_eq!((s.caret(), s.affinity()), (12, Affinity::Upstream));
        assert!(s.move_left(&u));
        assert_eq!((s.caret(), s.affinity()), (1, Affinity::Downstream));
    }

    #[test]
    fn extend_and_clamp() {
        let mut s = SelectionController::new();
        s.extend_selection(8, 2, 5);
        assert_eq!(s.range(), TextRange::new(2, 5));
        s.extend_selection(3, 3, 5);
        assert!(!s.has_selection());
        s.select_all(7);
        s.clamp_to(4);
        assert_eq!(s.range(), TextRange::new(0, 4));
    }

    #[test]
    fn handle_select_extends_from_anchor() {
        let u = utf16("ab😀c");
        let mut s = SelectionController::new();
        s.move_caret(2, Affinity::Downstream, u.len());
        assert!(s.handle_select_right(&u));
        assert_eq!(s.range(), TextRange::new(2, 4));
        assert!(s.handle_select_left(&u));
        assert!(s.handle_select_left(&u));
        assert_eq!(s.range(), TextRange::new(1, 2));
        assert_eq!(s.anchor(), 2);
    }

    #[test]
    fn explicit_offsets_never_split_a_cluster() {
        let u = utf16("a😀b");
        let mut s = SelectionController::new();
        s.set_selection(2, 2, &u);
        assert_eq!(s.range(), TextRange::caret(1));
        s.set_caret_position(2, &u);
        assert_eq!(s.caret(), 1);

        s.set_selection(2, 4, &u);
        assert_eq!((s.anchor(), s.caret()), (1, 4));
        s.set_selection(4, 2, &u);
        assert_eq!((s.anchor(), s.caret()), (4, 1));

        let family = utf16("x👨‍👩‍👦‍👦");
        s.set_selection(0, 5, &family);
        assert_eq!(s.range(), TextRange::new(0, 12));
    }

    #[test]
    fn delete_selection_collapses_to_start() {
        let mut buf = Buffer::with_text("hello", ContentPolicy::default());
        let mut s = SelectionController::new();
        s.set_selection(1, 3, &buf.units());
        assert_eq!(s.delete_selection(&mut buf).unwrap().as_deref(), Some("el"));
        assert_eq!(buf.text(), "hlo");
        assert_eq!(s.range(), TextRange::caret(1));
        assert_eq!(s.delete_selection(&mut buf).unwrap(), None);
    }

    #[test]
    fn word_moves_skip_whitespace() {
        let text = "hello big world";
        let u = utf16(text);
        let l = layout(text, 500.0);
        let mut s = SelectionController::new();
        s.move_caret(u.len(), Affinity::Downstream, u.len());
        assert!(s.move_left_word(&u, &l));
        assert_eq!(s.caret(), 10);
        assert!(s.move_left_word(&u, &l));
        assert_eq!(s.caret(), 6);
        assert!(s.move_right_word(&u, &l));
        assert_eq!(s.caret(), 9);
        assert!(s.move_right_word(&u, &l));
        assert_eq!(s.caret(), 15);
        assert!(!s.move_right_word(&u, &l));
    }

    #[test]
    fn line_moves_follow_wrapping_and_affinity() {
        let text = "abcdef";
        let u = utf16(text);
        let l = layout(text, 30.0);
        let mut s = SelectionController::new();
        s.move_caret(4, Affinity::Downstream, u.len());
        assert!(s.move_line_begin(&u, &l));
        assert_eq!(s.caret(), 3);
        s.move_caret(1, Affinity::Downstream, u.len());
        assert!(s.move_line_end(&u, &l));
        assert_eq!((s.caret(), s.affinity()), (3, Affinity::Upstream));
        // Upstream caret at the wrap still belongs to the first line.
        assert!(s.move_line_begin(&u, &l));
        assert_eq!(s.caret(), 0);
    }

    #[test]
    fn paragraph_moves_never_stall_at_boundaries() {
        let text = "ab\ncd\nef";
        let u = utf16(text);
        let mut s = SelectionController::new();
        s.move_caret(6, Affinity::Downstream, u.len());
        assert!(s.move_paragraph_begin(&u));
        assert_eq!(s.caret(), 3);
        assert!(s.move_paragraph_end(&u));
        assert_eq!(s.caret(), 5);
        assert!(s.move_paragraph_end(&u));
        assert_eq!(s.caret(), 8);
        assert!(!s.move_paragraph_end(&u));
    }

    #[test]
    fn select_word_uses_oracle() {
        let text = "one two";
        let l = layout(text, 500.0);
        let mut s = SelectionController::new();
        s.select_word_at(5, 7, &l);
        assert_eq!(s.range(), TextRange::new(4, 7));
    }
}
