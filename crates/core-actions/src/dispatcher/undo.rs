//! Undo / redo through the snapshot engine.
//!
//! An active composition is committed first (undo operates on committed
//! content). The restore is announced through `will_change`; a veto puts the
//! taken snapshot back so both stacks are exactly as before.

use super::{EditContext, content_changed, preview};
use core_events::{ChangeValueInfo, Invalidation, PreviewText};
use core_state::{EditSnapshot, SnapshotKind};
use core_text::{EditError, EditResult, TextRange};
use tracing::trace;

#[derive(Clone, Copy)]
enum HistoryStep {
    Undo,
    Redo,
}

impl HistoryStep {
    fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

fn step(ctx: &mut EditContext<'_>, which: HistoryStep) -> EditResult<Invalidation> {
    let inv = preview::finish_implicit(ctx)?;
    let current = ctx.state.snapshot(SnapshotKind::Edit);
    let old_content = current.text.clone();
    let range_before = ctx.state.selection.range();
    let taken = match which {
        HistoryStep::Undo => ctx.state.undo.undo(current),
        HistoryStep::Redo => ctx.state.undo.redo(current),
    };
    let Some(target) = taken else {
        trace!(target: "actions.dispatch", op = which.name(), "history_empty");
        return Ok(inv);
    };

    let change = ChangeValueInfo {
        old_content,
        value: target.text.clone(),
        range_before,
        range_after: TextRange::new(target.anchor, target.caret),
        old_preview_text: PreviewText::default(),
        preview_text: PreviewText::default(),
    };
    if !ctx.listeners.fire_will_change(&change) {
        revert(ctx, which, target);
        if inv.is_empty() {
            return Err(EditError::Vetoed);
        }
        return Ok(inv);
    }

    ctx.state.restore(&target);
    ctx.state.revalidate();
    trace!(
        target: "actions.dispatch",
        op = which.name(),
        len = ctx.state.len(),
        undo_depth = ctx.state.undo.undo_depth(),
        redo_depth = ctx.state.undo.redo_depth(),
        "history"
    );
    ctx.notify_change();
    Ok(inv | content_changed())
}

fn revert(ctx: &mut EditContext<'_>, which: HistoryStep, taken: EditSnapshot) {
    match which {
        HistoryStep::Undo => ctx.state.undo.revert_undo(taken),
        HistoryStep::Redo => ctx.state.undo.revert_redo(taken),
    }
}

pub(crate) fn handle_undo(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    step(ctx, HistoryStep::Undo)
}

pub(crate) fn handle_redo(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    step(ctx, HistoryStep::Redo)
}
