//! Field state: content buffer, selection, composition and undo history.
//!
//! `FieldState` groups the owned state of one text field so invariants that
//! span components live in one place:
//! - `selection` never points past `buffer.len_utf16()`; every mutation helper
//!   ends with `revalidate()`.
//! - An active preview span always lies inside the buffer.
//! - Undo snapshots capture committed content only; an active composition is
//!   rolled back in the captured text.
//!
//! Components:
//! - `selection::SelectionController` - caret/anchor/affinity and movement.
//! - `preview::PreviewCoordinator` - IME composition span.
//! - `undo::UndoEngine` - snapshot stacks with typing-run coalescing.
//!
//! `clipboard` holds the clipboard seam; the clipboard itself is owned by the
//! sequencer, not by `FieldState`.

use core_text::{Buffer, ContentPolicy, utf16_len};

pub mod clipboard;
pub mod preview;
pub mod selection;
pub mod undo;

pub use clipboard::{Clipboard, CopyOptions, LocalClipboard};
pub use preview::{FocusLossPolicy, PreviewCoordinator, PreviewSpan, PreviewState};
pub use selection::SelectionController;
pub use undo::{EditSnapshot, InsertRun, SnapshotKind, UNDO_HISTORY_MAX, UndoEngine};

pub struct FieldState {
    pub buffer: Buffer,
    pub selection: SelectionController,
    pub preview: PreviewCoordinator,
    pub undo: UndoEngine,
}

impl FieldState {
    pub fn new(policy: ContentPolicy, undo_capacity: usize) -> Self {
        Self {
            buffer: Buffer::new(policy),
            selection: SelectionController::new(),
            preview: PreviewCoordinator::new(),
            undo: UndoEngine::new(undo_capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len_utf16()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clamp selection to the current content length.
    pub fn revalidate(&mut self) {
        self.selection.clamp_to(self.buffer.len_utf16());
    }

    /// Content with any composition text cut out.
    pub fn committed_value(&self) -> String {
        self.preview.committed_value(&self.buffer)
    }

    /// Snapshot of committed content. An active composition is rolled back
    /// in the captured text so undo returns to the pre-composition value.
    pub fn snapshot(&self, kind: SnapshotKind) -> EditSnapshot {
        let Some(span) = self.preview.span() else {
            return EditSnapshot::capture(
                kind,
                self.buffer.text(),
                self.selection.anchor(),
                self.selection.caret(),
            );
        };
        let units = self.buffer.units();
        let end = span.end().min(units.len());
        let start = span.start.min(end);
        let mut text = String::from_utf16_lossy(&units[..start]);
        text.push_str(&span.replaced);
        text.push_str(&String::from_utf16_lossy(&units[end..]));
        let caret = start + utf16_len(&span.replaced);
        EditSnapshot::capture(kind, text, caret, caret)
    }

    /// Replace content and selection with `snap`. Composition is dropped.
    pub fn restore(&mut self, snap: &EditSnapshot) {
        let len = self.buffer.set_all(&snap.text);
        self.preview.reset();
        self.selection.extend_selection(snap.anchor, snap.caret, len);
    }
}
