//! UTF-16 addressed segmentation adapter.
//!
//! Contract:
//! - Input: a UTF-16 code-unit sequence (possibly containing lone surrogates).
//! - Output: a UTF-8 mirror of the sequence plus a bidirectional mapping between
//!   code-unit offsets and byte offsets, and grapheme boundaries addressed in
//!   code units.
//! - Lone surrogates decode to U+FFFD but still occupy exactly one code unit so
//!   offsets stay faithful to the input.
//! - Offsets that fall inside a surrogate pair have no byte mapping; callers
//!   snap them with [`Utf16Index::floor_char`] / [`Utf16Index::ceil_char`].

use unicode_segmentation::GraphemeCursor;

/// UTF-8 mirror of a UTF-16 sequence with offset translation tables.
#[derive(Debug, Clone)]
pub struct Utf16Index {
    text: String,
    // (code-unit offset, byte offset) of every char start plus the end sentinel.
    boundaries: Vec<(usize, usize)>,
}

impl Utf16Index {
    pub fn new(units: &[u16]) -> Self {
        let mut text = String::with_capacity(units.len());
        let mut boundaries = Vec::with_capacity(units.len() + 1);
        let mut unit = 0usize;
        for decoded in char::decode_utf16(units.iter().copied()) {
            boundaries.push((unit, text.len()));
            let (c, width) = match decoded {
                Ok(c) => (c, c.len_utf16()),
                Err(_) => ('\u{FFFD}', 1),
            };
            text.push(c);
            unit += width;
        }
        boundaries.push((unit, text.len()));
        Self { text, boundaries }
    }

    pub fn len_utf16(&self) -> usize {
        self.boundaries.last().map(|(u, _)| *u).unwrap_or(0)
    }

    /// Byte offset for a code-unit offset sitting on a char boundary.
    pub fn byte_at(&self, unit: usize) -> Option<usize> {
        self.boundaries
            .binary_search_by_key(&unit, |(u, _)| *u)
            .ok()
            .map(|i| self.boundaries[i].1)
    }

    /// Code-unit offset for a byte offset sitting on a char boundary.
    pub fn unit_at(&self, byte: usize) -> usize {
        match self.boundaries.binary_search_by_key(&byte, |(_, b)| *b) {
            Ok(i) => self.boundaries[i].0,
            Err(i) => self.boundaries[i.saturating_sub(1)].0,
        }
    }

    /// Largest char boundary `<= unit` (clamped to the sequence).
    pub fn floor_char(&self, unit: usize) -> usize {
        let unit = unit.min(self.len_utf16());
        match self.boundaries.binary_search_by_key(&unit, |(u, _)| *u) {
            Ok(_) => unit,
            Err(i) => self.boundaries[i.saturating_sub(1)].0,
        }
    }

    /// Smallest char boundary `>= unit` (clamped to the sequence).
    pub fn ceil_char(&self, unit: usize) -> usize {
        let unit = unit.min(self.len_utf16());
        match self.boundaries.binary_search_by_key(&unit, |(u, _)| *u) {
            Ok(_) => unit,
            Err(i) => self.boundaries[i.min(self.boundaries.len() - 1)].0,
        }
    }

    /// True when `unit` starts a grapheme cluster or is the end of the
    /// sequence. Offsets inside a surrogate pair never are.
    pub fn is_boundary(&self, unit: usize) -> bool {
        let Some(byte) = self.byte_at(unit) else {
            return false;
        };
        let mut cursor = GraphemeCursor::new(byte, self.text.len(), true);
        cursor.is_boundary(&self.text, 0).unwrap_or(true)
    }

    /// Previous grapheme boundary strictly before `unit` (0 when none).
    pub fn prev_boundary(&self, unit: usize) -> usize {
        let unit = self.ceil_char(unit);
        if unit == 0 {
            return 0;
        }
        let Some(byte) = self.byte_at(unit) else {
            return 0;
        };
        let mut cursor = GraphemeCursor::new(byte, self.text.len(), true);
        match cursor.prev_boundary(&self.text, 0) {
            Ok(Some(b)) => self.unit_at(b),
            Ok(None) => 0,
            // Whole text is one chunk; fall back to a single char step.
            Err(_) => self.floor_char(unit - 1),
        }
    }

    /// Next grapheme boundary strictly after `unit` (length when none).
    pub fn next_boundary(&self, unit: usize) -> usize {
        let len = self.len_utf16();
        let unit = self.floor_char(unit);
        if unit >= len {
            return len;
        }
        let Some(byte) = self.byte_at(unit) else {
            return len;
        };
        let mut cursor = GraphemeCursor::new(byte, self.text.len(), true);
        match cursor.next_boundary(&self.text, 0) {
            Ok(Some(b)) => self.unit_at(b),
            Ok(None) => len,
            Err(_) => self.ceil_char(unit + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn offsets_translate_across_surrogate_pairs() {
        let idx = Utf16Index::new(&utf16("a😀b"));
        assert_eq!(idx.len_utf16(), 4);
        assert_eq!(idx.byte_at(1), Some(1));
        assert_eq!(idx.byte_at(2), None); // inside the pair
        assert_eq!(idx.byte_at(3), Some(5));
        assert_eq!(idx.floor_char(2), 1);
        assert_eq!(idx.ceil_char(2), 3);
    }

    #[test]
    fn lone_surrogate_keeps_unit_width() {
        let units = vec![0x61, 0xD83D, 0x62];
        let idx = Utf16Index::new(&units);
        assert_eq!(idx.len_utf16(), 3);
        assert_eq!(idx.next_boundary(1), 2);
        assert_eq!(idx.prev_boundary(3), 2);
    }

    #[test]
    fn boundaries_follow_grapheme_clusters() {
        let units = utf16("漢😀e\u{301}\r\nz");
        let idx = Utf16Index::new(&units);
        let stops: Vec<usize> = (0..=units.len()).filter(|u| idx.is_boundary(*u)).collect();
        assert_eq!(stops, vec![0, 1, 3, 5, 7, 8]);
        assert_eq!(idx.next_boundary(3), 5);
        assert_eq!(idx.prev_boundary(7), 5);
    }
}
