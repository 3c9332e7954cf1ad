//! IME composition (preview text) state.
//!
//! `Idle -> Previewing -> {finish | discard} -> Idle`. While previewing, the
//! composition text is spliced into the buffer at `span.start`; the span also
//! remembers the committed text it replaced so a discard restores the content
//! exactly.
//!
//! A replacement range must either contain the active span or lie inside it
//! (both collapse into one span), or not touch it at all (the old span is
//! committed first). A partial overlap has no well-defined collapse and is
//! rejected with `InvalidRange`.

use core_text::{Buffer, EditError, EditResult, TextRange, utf16_len};
use serde::Deserialize;
use tracing::trace;

/// What happens to an active preview when the field loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusLossPolicy {
    /// Leave the composition in place so it can resume.
    #[default]
    Keep,
    Commit,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSpan {
    pub start: usize,
    /// Composition text as spliced into the buffer.
    pub text: String,
    /// Committed text the composition replaced.
    pub replaced: String,
}

impl PreviewSpan {
    pub fn end(&self) -> usize {
        self.start + utf16_len(&self.text)
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Previewing(PreviewSpan),
}

#[derive(Debug, Clone, Default)]
pub struct PreviewCoordinator {
    state: PreviewState,
}

impl PreviewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn span(&self) -> Option<&PreviewSpan> {
        match &self.state {
            PreviewState::Previewing(span) => Some(span),
            PreviewState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.span().is_some()
    }

    /// `buffer` content with the composition text cut out.
    pub fn committed_value(&self, buffer: &Buffer) -> String {
        let text = buffer.text();
        let Some(span) = self.span() else {
            return text;
        };
        let units: Vec<u16> = text.encode_utf16().collect();
        let end = span.end().min(units.len());
        let mut out = String::from_utf16_lossy(&units[..span.start.min(end)]);
        out.push_str(&String::from_utf16_lossy(&units[end..]));
        out
    }

    /// Range a preview request will replace. Without an explicit range the
    /// active span is replaced, or `selection` when idle.
    pub fn resolve_range(
        &self,
        requested: Option<TextRange>,
        selection: TextRange,
        len: usize,
    ) -> EditResult<TextRange> {
        let Some(r) = requested else {
            return Ok(self.span().map_or(selection, PreviewSpan::range));
        };
        if r.start > r.end || r.end > len {
            return Err(EditError::invalid_range(r.start, r.end, len));
        }
        if let Some(span) = self.span() {
            let active = span.range();
            let nested = r.contains_range(&active) || active.contains_range(&r);
            if !nested && r.overlaps(&active) {
                return Err(EditError::invalid_range(r.start, r.end, len));
            }
        }
        Ok(r)
    }

    /// Splice `text` over `range` as composition. `text` is filtered and
    /// truncated by the buffer policy. Returns the caret after the preview.
    pub fn set_preview(
        &mut self,
        buffer: &mut Buffer,
        range: TextRange,
        text: &str,
    ) -> EditResult<usize> {
        let range = self.resolve_range(Some(range), range, buffer.len_utf16())?;
        let sanitized = buffer.sanitize(text, range.len());
        let removed = buffer.delete_range(range.start, range.end)?;
        let ins = buffer.insert_sanitized(range.start, &sanitized.text)?;
        let inserted_len = ins.end - ins.start;

        let (start, end, replaced) = match self.span() {
            Some(span) if range.contains_range(&span.range()) => {
                let pre = span.start - range.start;
                let post = span.end() - range.start;
                let units: Vec<u16> = removed.encode_utf16().collect();
                let mut replaced = String::from_utf16_lossy(&units[..pre]);
                replaced.push_str(&span.replaced);
                replaced.push_str(&String::from_utf16_lossy(&units[post..]));
                (ins.start, ins.end, replaced)
            }
            Some(span) if span.range().contains_range(&range) => (
                span.start,
                span.end() - range.len() + inserted_len,
                span.replaced.clone(),
            ),
            _ => (ins.start, ins.end, removed),
        };
        let span = PreviewSpan {
            start,
            text: buffer.slice(start, end)?,
            replaced,
        };
        trace!(target: "state.preview", op = "set", start, len = end - start, "previewing");
        self.state = if span.text.is_empty() && span.replaced.is_empty() {
            PreviewState::Idle
        } else {
            PreviewState::Previewing(span)
        };
        Ok(ins.end)
    }

    /// Commit the active composition. The text already sits in the buffer.
    pub fn finish(&mut self) -> Option<PreviewSpan> {
        match std::mem::take(&mut self.state) {
            PreviewState::Previewing(span) => {
                trace!(target: "state.preview", op = "finish", start = span.start, "committed");
                Some(span)
            }
            PreviewState::Idle => None,
        }
    }

    /// Roll the composition out of `buffer`, restoring the replaced text.
    /// Returns the caret position after the rollback.
    pub fn discard(&mut self, buffer: &mut Buffer) -> EditResult<Option<usize>> {
        let PreviewState::Previewing(span) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        buffer.delete_range(span.start, span.end())?;
        let ins = buffer.insert_sanitized(span.start, &span.replaced)?;
        trace!(target: "state.preview", op = "discard", start = span.start, "rolled_back");
        Ok(Some(ins.end))
    }

    /// Drop composition state without touching the buffer (whole-value
    /// replacement already removed it).
    pub fn reset(&mut self) {
        if self.is_active() {
            trace!(target: "state.preview", op = "reset", "discarded");
        }
        self.state = PreviewState::Idle;
    }
}
