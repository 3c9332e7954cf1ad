//! Handlers applying one `PendingOperation` to field state.
//!
//! Sub-modules:
//! * `clipboard` - copy, cut and paste
//! * `edit`      - insert, delete (backward/forward/range) and whole-value set
//! * `preview`   - composition set / finish / discard
//! * `selection` - explicit selection with menu policy
//! * `undo`      - undo / redo through the snapshot engine
//!
//! Every handler runs the full callback sequence for its operation before
//! returning. A `will` veto surfaces as `Err(EditError::Vetoed)` when nothing
//! was applied yet; once part of an operation has mutated the buffer the
//! handler reports the invalidation it produced instead.

use crate::PendingOperation;
use core_events::{Invalidation, ListenerRegistry, PreviewText};
use core_state::{Clipboard, CopyOptions, FieldState};
use core_text::EditResult;

mod clipboard;
mod edit;
mod preview;
mod selection;
mod undo;

/// Mutable view over the state one operation may touch.
pub(crate) struct EditContext<'a> {
    pub state: &'a mut FieldState,
    pub listeners: &'a mut ListenerRegistry,
    pub clipboard: &'a mut dyn Clipboard,
    pub copy_options: CopyOptions,
    pub preview_enabled: bool,
}

impl EditContext<'_> {
    /// Terminal `on_change` with the committed value and active preview.
    pub(crate) fn notify_change(&mut self) {
        let value = self.state.committed_value();
        let preview = preview_text(self.state);
        self.listeners.fire_change(&value, &preview);
    }
}

/// Active composition as reported to listeners.
pub(crate) fn preview_text(state: &FieldState) -> PreviewText {
    state.preview.span().map_or_else(PreviewText::default, |span| {
        PreviewText::at(span.start, span.text.clone())
    })
}

pub(crate) fn dispatch(
    op: PendingOperation,
    ctx: &mut EditContext<'_>,
) -> EditResult<Invalidation> {
    match op {
        PendingOperation::Insert { text, source } => edit::handle_insert(ctx, &text, source),
        PendingOperation::DeleteBackward(count) => edit::handle_delete_backward(ctx, count),
        PendingOperation::DeleteForward(count) => edit::handle_delete_forward(ctx, count),
        PendingOperation::DeleteRange { start, end } => edit::handle_delete_range(ctx, start, end),
        PendingOperation::SetValue(text) => edit::handle_set_value(ctx, &text),
        PendingOperation::SetPreview { range, text } => {
            preview::handle_set_preview(ctx, range, &text)
        }
        PendingOperation::FinishPreview => preview::handle_finish(ctx),
        PendingOperation::DiscardPreview => preview::handle_discard(ctx),
        PendingOperation::SetSelection { start, end, menu } => {
            selection::handle_set_selection(ctx, start, end, menu)
        }
        PendingOperation::Copy => clipboard::handle_copy(ctx),
        PendingOperation::Cut => clipboard::handle_cut(ctx),
        PendingOperation::Paste => clipboard::handle_paste(ctx),
        PendingOperation::Undo => undo::handle_undo(ctx),
        PendingOperation::Redo => undo::handle_redo(ctx),
    }
}

/// Invalidation for an operation that changed content and moved the caret.
pub(crate) fn content_changed() -> Invalidation {
    Invalidation::CONTENT | Invalidation::SELECTION | Invalidation::CARET
}
