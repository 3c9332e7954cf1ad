//! `TextField`: one editable field wired to a paragraph layout.
//!
//! Content operations go through the sequencer queue and return the
//! `Invalidation` produced by the pass. Caret movement fires no content
//! callbacks and is applied directly; it returns whether the caret moved.
//! After every pass that changed content the layout is rerun before any
//! geometry is resolved, and the cached prototype caret is refreshed.

use crate::{EditSequencer, MenuPolicy, OperationSender, PendingOperation};
use core_config::Config;
use core_events::{EditListener, InputSource, Invalidation, PreviewText};
use core_model::{Affinity, CaretGeometryResolver, Rect, TextAlign, TextLayout};
use core_state::{
    Clipboard, CopyOptions, FieldState, FocusLossPolicy, SelectionController, UNDO_HISTORY_MAX,
};
use core_text::{ContentPolicy, TextRange};
use tracing::trace;

pub struct TextField<L: TextLayout> {
    sequencer: EditSequencer,
    layout: L,
    caret: CaretGeometryResolver,
    width: f32,
    focus_policy: FocusLossPolicy,
}

impl<L: TextLayout> TextField<L> {
    /// Field with default policy: no max length, no filter, previews on.
    pub fn new(layout: L, width: f32) -> Self {
        Self::with_policy(ContentPolicy::default(), layout, width)
    }

    pub fn with_policy(policy: ContentPolicy, layout: L, width: f32) -> Self {
        let sequencer = EditSequencer::new(FieldState::new(policy, UNDO_HISTORY_MAX));
        let caret = CaretGeometryResolver::default();
        Self::assemble(sequencer, layout, width, caret, FocusLossPolicy::default())
    }

    pub fn from_config(config: &Config, layout: L, width: f32) -> Self {
        let file = &config.file;
        let state = FieldState::new(config.content_policy(), file.undo.history);
        let sequencer = EditSequencer::new(state)
            .with_preview_enabled(file.preview.enabled)
            .with_copy_options(file.field.copy_options);
        let caret = CaretGeometryResolver::new(config.caret_width(), file.field.text_align);
        Self::assemble(sequencer, layout, width, caret, file.preview.on_focus_loss)
    }

    fn assemble(
        sequencer: EditSequencer,
        layout: L,
        width: f32,
        caret: CaretGeometryResolver,
        focus_policy: FocusLossPolicy,
    ) -> Self {
        let mut field = Self {
            sequencer,
            layout,
            caret,
            width,
            focus_policy,
        };
        field.relayout();
        field
    }

    // ---------------------------------------------------------------------------------------------
    // Plumbing
    // ---------------------------------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Box<dyn EditListener>) {
        self.sequencer.register(listener);
    }

    /// Handle for submitting operations from inside callbacks.
    pub fn sender(&self) -> OperationSender {
        self.sequencer.sender()
    }

    pub fn sequencer(&self) -> &EditSequencer {
        &self.sequencer
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.caret.set_align(align);
    }

    /// Replace the clipboard used by cut, copy and paste.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.sequencer.set_clipboard(clipboard);
    }

    pub fn set_copy_options(&mut self, options: CopyOptions) {
        self.sequencer.set_copy_options(options);
    }

    pub fn set_focus_loss_policy(&mut self, policy: FocusLossPolicy) {
        self.focus_policy = policy;
    }

    pub fn set_width(&mut self, width: f32) -> Invalidation {
        self.width = width;
        self.relayout();
        Invalidation::CARET | Invalidation::SELECTION
    }

    fn relayout(&mut self) {
        let text = self.sequencer.state().buffer.text();
        self.layout.layout(&text, self.width);
        self.refresh_proto();
    }

    fn refresh_proto(&mut self) {
        let state = self.sequencer.state();
        let units = state.buffer.units();
        let (caret, affinity) = (state.selection.caret(), state.selection.affinity());
        self.caret.resolve_or_cached(&self.layout, &units, caret, affinity);
    }

    fn settle(&mut self, inv: Invalidation) -> Invalidation {
        if inv.contains(Invalidation::CONTENT) {
            self.relayout();
        } else if inv.intersects(Invalidation::CARET | Invalidation::SELECTION) {
            self.refresh_proto();
        }
        inv
    }

    fn submit(&mut self, op: PendingOperation) -> Invalidation {
        let inv = self.sequencer.submit(op);
        self.settle(inv)
    }

    // ---------------------------------------------------------------------------------------------
    // Content operations
    // ---------------------------------------------------------------------------------------------

    pub fn insert_value(&mut self, text: &str, source: InputSource) -> Invalidation {
        self.submit(PendingOperation::Insert {
            text: text.to_owned(),
            source,
        })
    }

    pub fn delete_backward(&mut self, count: usize) -> Invalidation {
        self.submit(PendingOperation::DeleteBackward(count))
    }

    pub fn delete_forward(&mut self, count: usize) -> Invalidation {
        self.submit(PendingOperation::DeleteForward(count))
    }

    pub fn delete_range(&mut self, start: usize, end: usize) -> Invalidation {
        self.submit(PendingOperation::DeleteRange { start, end })
    }

    pub fn set_value(&mut self, text: &str) -> Invalidation {
        self.submit(PendingOperation::SetValue(text.to_owned()))
    }

    pub fn set_selection(&mut self, start: usize, end: usize, menu: MenuPolicy) -> Invalidation {
        self.submit(PendingOperation::SetSelection { start, end, menu })
    }

    /// Set composition text over `range` (or the active span / selection).
    /// Returns 0 on success or when the request was queued for the next
    /// frame, otherwise the error code.
    pub fn set_preview_text(&mut self, text: &str, range: Option<TextRange>) -> i32 {
        self.submit(PendingOperation::SetPreview {
            range,
            text: text.to_owned(),
        });
        self.sequencer.preview_status()
    }

    pub fn finish_preview(&mut self) -> Invalidation {
        self.submit(PendingOperation::FinishPreview)
    }

    pub fn discard_preview(&mut self) -> Invalidation {
        self.submit(PendingOperation::DiscardPreview)
    }

    pub fn copy(&mut self) -> Invalidation {
        self.submit(PendingOperation::Copy)
    }

    pub fn cut(&mut self) -> Invalidation {
        self.submit(PendingOperation::Cut)
    }

    pub fn paste(&mut self) -> Invalidation {
        self.submit(PendingOperation::Paste)
    }

    pub fn undo(&mut self) -> Invalidation {
        self.submit(PendingOperation::Undo)
    }

    pub fn redo(&mut self) -> Invalidation {
        self.submit(PendingOperation::Redo)
    }

    /// Frame tick: apply operations deferred by the previous pass.
    pub fn process_frame(&mut self) -> Invalidation {
        let inv = self.sequencer.process_frame();
        self.settle(inv)
    }

    /// Apply the focus-loss policy to an active composition.
    pub fn on_blur(&mut self) -> Invalidation {
        trace!(
            target: "actions.dispatch",
            policy = ?self.focus_policy,
            preview = self.sequencer.state().preview.is_active(),
            "blur"
        );
        match self.focus_policy {
            FocusLossPolicy::Keep => Invalidation::empty(),
            FocusLossPolicy::Commit => self.finish_preview(),
            FocusLossPolicy::Discard => self.discard_preview(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Movement
    // ---------------------------------------------------------------------------------------------

    fn movement(&mut self, f: impl FnOnce(&mut FieldState, &[u16], &L) -> bool) -> bool {
        let state = self.sequencer.state_mut();
        let units = state.buffer.units();
        state.undo.end_insert_coalescing();
        let moved = f(state, &units, &self.layout);
        self.refresh_proto();
        moved
    }

    pub fn cursor_move_left(&mut self) -> bool {
        self.movement(|st, units, _| st.selection.move_left(units))
    }

    pub fn cursor_move_right(&mut self) -> bool {
        self.movement(|st, units, _| st.selection.move_right(units))
    }

    pub fn cursor_move_left_word(&mut self) -> bool {
        self.movement(|st, units, layout| st.selection.move_left_word(units, layout))
    }

    pub fn cursor_move_right_word(&mut self) -> bool {
        self.movement(|st, units, layout| st.selection.move_right_word(units, layout))
    }

    pub fn cursor_move_line_begin(&mut self) -> bool {
        self.movement(|st, units, layout| st.selection.move_line_begin(units, layout))
    }

    pub fn cursor_move_line_end(&mut self) -> bool {
        self.movement(|st, units, layout| st.selection.move_line_end(units, layout))
    }

    pub fn cursor_move_paragraph_begin(&mut self) -> bool {
        self.movement(|st, units, _| st.selection.move_paragraph_begin(units))
    }

    pub fn cursor_move_paragraph_end(&mut self) -> bool {
        self.movement(|st, units, _| st.selection.move_paragraph_end(units))
    }

    /// Collapse the caret at `index` (clamped).
    pub fn set_caret_position(&mut self, index: usize) -> Invalidation {
        self.movement(|st, units, _| {
            st.selection.set_caret_position(index, units);
            true
        });
        Invalidation::CARET | Invalidation::SELECTION
    }

    /// Place the caret for a click at `(x, y)`; the affinity follows the
    /// candidate closer to the click.
    pub fn place_caret_at_point(&mut self, x: f32, y: f32) -> Invalidation {
        let offset = self.layout.offset_for_point(x, y);
        let units = self.sequencer.state().buffer.units();
        let affinity = match self.caret.resolve_for_click(&self.layout, &units, offset, x) {
            Ok((_, affinity)) => affinity,
            Err(_) => Affinity::Downstream,
        };
        self.movement(|st, units, _| {
            st.selection.move_caret(offset, affinity, units.len());
            true
        });
        Invalidation::CARET | Invalidation::SELECTION
    }

    // ---------------------------------------------------------------------------------------------
    // Selection extras
    // ---------------------------------------------------------------------------------------------

    pub fn select_all(&mut self) -> Invalidation {
        let len = self.sequencer.state().len();
        self.set_selection(0, len, MenuPolicy::Default)
    }

    /// Extend the selection one cluster left of the caret, keeping the anchor.
    pub fn handle_select_left(&mut self) -> Invalidation {
        let (anchor, caret) = self.preview_selection(|sel, units| {
            sel.handle_select_left(units);
        });
        self.set_selection(anchor, caret, MenuPolicy::Default)
    }

    pub fn handle_select_right(&mut self) -> Invalidation {
        let (anchor, caret) = self.preview_selection(|sel, units| {
            sel.handle_select_right(units);
        });
        self.set_selection(anchor, caret, MenuPolicy::Default)
    }

    /// Select the word containing `offset`.
    pub fn select_word_at(&mut self, offset: usize) -> Invalidation {
        let len = self.sequencer.state().len();
        let layout = &self.layout;
        let (anchor, caret) =
            self.preview_selection(|sel, _| sel.select_word_at(offset, len, layout));
        self.set_selection(anchor, caret, MenuPolicy::Default)
    }

    fn preview_selection(
        &self,
        f: impl FnOnce(&mut SelectionController, &[u16]),
    ) -> (usize, usize) {
        let state = self.sequencer.state();
        let mut sel = state.selection;
        f(&mut sel, &state.buffer.units());
        (sel.anchor(), sel.caret())
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    pub fn caret_index(&self) -> usize {
        self.sequencer.state().selection.caret()
    }

    pub fn selection(&self) -> TextRange {
        self.sequencer.state().selection.range()
    }

    pub fn affinity(&self) -> Affinity {
        self.sequencer.state().selection.affinity()
    }

    /// Full buffer content, composition included.
    pub fn text_value(&self) -> String {
        self.sequencer.state().buffer.text()
    }

    /// Content with composition text cut out.
    pub fn committed_value(&self) -> String {
        self.sequencer.state().committed_value()
    }

    pub fn preview_text(&self) -> PreviewText {
        crate::dispatcher::preview_text(self.sequencer.state())
    }

    /// Caret rect at the current caret, or the last good rect when the
    /// layout is degenerate.
    pub fn caret_rect(&self) -> Rect {
        let state = self.sequencer.state();
        let units = state.buffer.units();
        self.caret
            .resolve(&self.layout, &units, state.selection.caret(), state.selection.affinity())
            .unwrap_or_else(|_| self.caret.proto().unwrap_or_default())
    }

    fn handle_rect(&self, offset: usize, affinity: Affinity) -> Option<Rect> {
        let state = self.sequencer.state();
        if !state.selection.has_selection() {
            return None;
        }
        let units = state.buffer.units();
        self.caret.resolve(&self.layout, &units, offset, affinity).ok()
    }

    /// Handle at the selection start. `None` without a selection.
    pub fn first_handle_rect(&self) -> Option<Rect> {
        self.handle_rect(self.selection().start, Affinity::Downstream)
    }

    /// Handle at the selection end. `None` without a selection.
    pub fn second_handle_rect(&self) -> Option<Rect> {
        self.handle_rect(self.selection().end, Affinity::Upstream)
    }

    pub fn selection_rects(&self) -> Vec<Rect> {
        let r = self.selection();
        if r.is_empty() {
            return Vec::new();
        }
        self.layout.rects_for_range(r.start, r.end)
    }

    pub fn preview_rects(&self) -> Vec<Rect> {
        match self.sequencer.state().preview.span() {
            Some(span) => self.layout.rects_for_range(span.start, span.end()),
            None => Vec::new(),
        }
    }
}
