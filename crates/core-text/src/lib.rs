//! Rope-backed editable content addressed in UTF-16 code units.
//!
//! `Buffer` is the only owner of field content. Every mutation goes through
//! `insert*`, `delete_range` or `set_all`; none of them touch selection state,
//! callers re-validate their offsets after each change.
//!
//! Offsets are UTF-16 code units. An offset falling inside a surrogate pair is
//! snapped down to the start of that pair before splicing.

use ropey::Rope;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

pub mod cluster;
pub mod error;
pub mod filter;
pub mod segment;

pub use cluster::{
    Direction, cluster_len, expand_to_clusters, snap_to_cluster, step_clusters, utf16_len,
};
pub use error::{EditError, EditResult};
pub use filter::{FilterMode, InputFilter, InputType};

/// Half-open code-unit range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Range spanning `a` and `b` in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn clamp_to(&mut self, len: usize) {
        self.start = self.start.min(len);
        self.end = self.end.min(len);
    }

    pub fn contains_range(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the ranges share at least one code unit, or when an empty
    /// range sits strictly inside the other.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        if self.is_empty() || other.is_empty() {
            let (e, r) = if self.is_empty() { (self, other) } else { (other, self) };
            return r.start < e.start && e.start < r.end;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Admission rules applied to inserted text.
#[derive(Debug, Clone, Default)]
pub struct ContentPolicy {
    /// Upper bound in code units.
    pub max_length: Option<usize>,
    pub input_type: InputType,
    pub filter: Option<InputFilter>,
}

impl ContentPolicy {
    fn admits(&self, cluster: &str) -> bool {
        self.input_type.admits(cluster)
            && self.filter.as_ref().is_none_or(|f| f.admits(cluster))
    }
}

/// Text after filtering and max-length truncation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sanitized {
    pub text: String,
    /// Clusters removed by the filters or by the single-occurrence rule.
    pub dropped: usize,
    /// True when max length cut the tail.
    pub truncated: bool,
}

impl Sanitized {
    /// The filters removed a non-empty payload entirely.
    pub fn is_filtered_empty(&self) -> bool {
        self.text.is_empty() && self.dropped > 0
    }
}

/// Code-unit span occupied by freshly inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
    policy: ContentPolicy,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(ContentPolicy::default())
    }
}

impl Buffer {
    pub fn new(policy: ContentPolicy) -> Self {
        Self {
            rope: Rope::new(),
            policy,
        }
    }

    /// Buffer holding `content` after the policy has been applied to it.
    pub fn with_text(content: &str, policy: ContentPolicy) -> Self {
        let mut buf = Self::new(policy);
        buf.set_all(content);
        buf
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    pub fn len_utf16(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn units(&self) -> Vec<u16> {
        self.rope
            .chars()
            .flat_map(|c| {
                let mut buf = [0u16; 2];
                let n = c.encode_utf16(&mut buf).len();
                buf.into_iter().take(n)
            })
            .collect()
    }

    /// Free capacity once `replaced` code units have been removed.
    pub fn remaining_capacity(&self, replaced: usize) -> Option<usize> {
        self.policy
            .max_length
            .map(|max| max.saturating_sub(self.len_utf16().saturating_sub(replaced)))
    }

    fn snap(&self, offset: usize) -> usize {
        self.rope.char_to_utf16_cu(self.rope.utf16_cu_to_char(offset))
    }

    fn check_range(&self, start: usize, end: usize) -> EditResult<()> {
        let len = self.len_utf16();
        if start > end || end > len {
            return Err(EditError::invalid_range(start, end, len));
        }
        Ok(())
    }

    /// Copy of the code units in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> EditResult<String> {
        self.check_range(start, end)?;
        let s = self.rope.utf16_cu_to_char(self.snap(start));
        let e = self.rope.utf16_cu_to_char(self.snap(end));
        Ok(self.rope.slice(s..e).to_string())
    }

    /// Apply filters and max length to `text`, assuming `replaced` code units
    /// of existing content are removed by the same edit.
    ///
    /// Repeats of the input type's single-occurrence character are dropped
    /// here so they never use up capacity. With `replaced > 0` the removed
    /// text is unknown, so an occurrence already in the content is only
    /// collapsed after the splice.
    pub fn sanitize(&self, text: &str, replaced: usize) -> Sanitized {
        let capacity = self.remaining_capacity(replaced);
        let single = self.policy.input_type.collapse_char();
        let mut seen = replaced == 0
            && single.is_some_and(|ch| self.rope.chars().any(|c| c == ch));
        let mut out = Sanitized::default();
        let mut used = 0usize;
        for g in text.graphemes(true) {
            if !self.policy.admits(g) {
                out.dropped += 1;
                continue;
            }
            if let Some(ch) = single
                && g.starts_with(ch)
                && g.chars().count() == 1
            {
                if seen {
                    out.dropped += 1;
                    continue;
                }
                seen = true;
            }
            let w = utf16_len(g);
            if capacity.is_some_and(|cap| used + w > cap) {
                out.truncated = true;
                break;
            }
            used += w;
            out.text.push_str(g);
        }
        out
    }

    /// Filter, truncate and splice `text` at `offset`. Returns the caret
    /// offset after the inserted text.
    pub fn insert(&mut self, offset: usize, text: &str) -> EditResult<usize> {
        let sanitized = self.sanitize(text, 0);
        self.insert_sanitized(offset, &sanitized.text).map(|ins| ins.end)
    }

    /// Splice already-sanitized text. Max length is still enforced at a
    /// cluster boundary; the single-occurrence normalization of the input
    /// type runs afterwards.
    pub fn insert_sanitized(&mut self, offset: usize, text: &str) -> EditResult<Inserted> {
        self.check_range(offset, offset)?;
        let offset = self.snap(offset);
        let text = match self.remaining_capacity(0) {
            Some(cap) => cluster::truncate_to_units(text, cap),
            None => text,
        };
        let char_idx = self.rope.utf16_cu_to_char(offset);
        self.rope.insert(char_idx, text);
        let mut inserted = Inserted {
            start: offset,
            end: offset + utf16_len(text),
        };
        if let Some(ch) = self.policy.input_type.collapse_char() {
            self.collapse_repeated(ch, &mut inserted);
        }
        trace!(
            target: "text.buffer",
            op = "insert",
            offset,
            inserted = inserted.end - inserted.start,
            len = self.len_utf16(),
            "splice"
        );
        Ok(inserted)
    }

    /// Remove `[start, end)` and return the removed text.
    pub fn delete_range(&mut self, start: usize, end: usize) -> EditResult<String> {
        self.check_range(start, end)?;
        let s = self.rope.utf16_cu_to_char(self.snap(start));
        let e = self.rope.utf16_cu_to_char(self.snap(end));
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        trace!(target: "text.buffer", op = "delete", start, end, len = self.len_utf16(), "splice");
        Ok(removed)
    }

    /// Replace the entire content. Returns the new length.
    pub fn set_all(&mut self, text: &str) -> usize {
        self.rope = Rope::new();
        let sanitized = self.sanitize(text, 0);
        self.rope.insert(0, &sanitized.text);
        if let Some(ch) = self.policy.input_type.collapse_char() {
            let mut span = Inserted { start: 0, end: 0 };
            self.collapse_repeated(ch, &mut span);
        }
        trace!(
            target: "text.buffer",
            op = "set_all",
            len = self.len_utf16(),
            dropped = sanitized.dropped,
            "replace"
        );
        self.len_utf16()
    }

    // Keep the first occurrence of `ch`, drop the rest, shifting `span` for
    // every removal in front of it.
    fn collapse_repeated(&mut self, ch: char, span: &mut Inserted) {
        let positions: Vec<usize> = self
            .rope
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == ch)
            .map(|(i, _)| i)
            .collect();
        if positions.len() <= 1 {
            return;
        }
        for &ci in positions[1..].iter().rev() {
            let unit = self.rope.char_to_utf16_cu(ci);
            self.rope.remove(ci..ci + 1);
            let w = ch.len_utf16();
            if unit < span.start {
                span.start -= w;
            }
            if unit < span.end {
                span.end -= w;
            }
        }
        trace!(target: "text.buffer", op = "collapse", removed = positions.len() - 1, "normalize");
    }
}
