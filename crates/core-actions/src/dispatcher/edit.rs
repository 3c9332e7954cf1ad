//! Content mutation: insert, delete and whole-value replacement.
//!
//! Callback order per primitive:
//! * delete: `will_delete` -> `will_change` -> mutate -> `did_delete`
//! * insert: `will_insert` -> `will_change` -> mutate -> `did_insert`
//!
//! Replacing a selection runs the delete primitive then the insert primitive;
//! the operation closes with a single `on_change`. Mutations are computed on
//! a scratch copy of the buffer so `will_change` sees the exact resulting value
//! and a veto leaves the live buffer untouched.
//!
//! A span that turns out empty (nothing left to remove) fires no hooks.
//!
//! Undo: single-cluster direct typing with no selection coalesces into one
//! typing-run snapshot (a single-cluster backspace joins an active run).
//! Everything else pushes a discrete snapshot once its vetoes have passed.

use super::{EditContext, content_changed, preview};
use core_events::{
    ChangeValueInfo, DeleteDirection, DeleteValueInfo, InputSource, InsertValueInfo, Invalidation,
    PreviewText,
};
use core_model::Affinity;
use core_state::{FieldState, InsertRun, SnapshotKind};
use core_text::{
    Direction, EditError, EditResult, TextRange, cluster_len, expand_to_clusters, step_clusters,
};
use tracing::{debug, trace};

struct DeleteSpan {
    start: usize,
    end: usize,
    /// Offset reported by `will_delete`.
    will_offset: usize,
    /// Caret after the deletion, reported by `did_delete`.
    did_offset: usize,
    direction: DeleteDirection,
}

impl DeleteSpan {
    /// Selection or explicit range removal: reported as a backward delete
    /// from `end` collapsing to `start`.
    fn range(range: TextRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
            will_offset: range.end,
            did_offset: range.start,
            direction: DeleteDirection::Backward,
        }
    }
}

fn record_undo(state: &mut FieldState, coalesce: bool) {
    let snap = state.snapshot(SnapshotKind::Edit);
    if coalesce {
        state.undo.begin_insert_coalescing(snap);
        state.undo.note_insert_edit();
    } else {
        state.undo.push_discrete_edit_snapshot(snap);
    }
}

fn typing_run_active(state: &FieldState) -> bool {
    matches!(state.undo.insert_run(), InsertRun::Active { .. })
}

fn is_single_cluster(text: &str) -> bool {
    let units: Vec<u16> = text.encode_utf16().collect();
    !units.is_empty() && cluster_len(&units, 0, Direction::Forward) == units.len()
}

/// Run the delete primitive. `Ok(false)` when the span holds no text.
fn delete_span(ctx: &mut EditContext<'_>, span: DeleteSpan, coalesce: bool) -> EditResult<bool> {
    let removed = ctx.state.buffer.slice(span.start, span.end)?;
    if removed.is_empty() {
        trace!(target: "actions.dispatch", op = "delete", start = span.start, "empty_span");
        return Ok(false);
    }
    let will = DeleteValueInfo {
        offset: span.will_offset,
        direction: span.direction,
        value: removed.clone(),
    };
    if !ctx.listeners.fire_will_delete(&will) {
        return Err(EditError::Vetoed);
    }

    let mut next = ctx.state.buffer.clone();
    next.delete_range(span.start, span.end)?;
    let change = ChangeValueInfo {
        old_content: ctx.state.buffer.text(),
        value: next.text(),
        range_before: ctx.state.selection.range(),
        range_after: TextRange::caret(span.did_offset),
        old_preview_text: PreviewText::default(),
        preview_text: PreviewText::default(),
    };
    if !ctx.listeners.fire_will_change(&change) {
        return Err(EditError::Vetoed);
    }

    record_undo(ctx.state, coalesce);
    ctx.state.buffer = next;
    let len = ctx.state.len();
    ctx.state.selection.move_caret(span.did_offset, Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(
        target: "actions.dispatch",
        op = "delete",
        start = span.start,
        end = span.end,
        caret = span.did_offset,
        len,
        "edit"
    );

    ctx.listeners.fire_did_delete(&DeleteValueInfo {
        offset: span.did_offset,
        direction: span.direction,
        value: removed,
    });
    Ok(true)
}

fn insert_text(ctx: &mut EditContext<'_>, at: usize, text: &str, coalesce: bool) -> EditResult<()> {
    let will = InsertValueInfo {
        offset: at,
        value: text.to_owned(),
    };
    if !ctx.listeners.fire_will_insert(&will) {
        return Err(EditError::Vetoed);
    }

    let mut next = ctx.state.buffer.clone();
    let ins = next.insert_sanitized(at, text)?;
    let change = ChangeValueInfo {
        old_content: ctx.state.buffer.text(),
        value: next.text(),
        range_before: ctx.state.selection.range(),
        range_after: TextRange::caret(ins.end),
        old_preview_text: PreviewText::default(),
        preview_text: PreviewText::default(),
    };
    if !ctx.listeners.fire_will_change(&change) {
        return Err(EditError::Vetoed);
    }

    let inserted = next.slice(ins.start, ins.end)?;
    record_undo(ctx.state, coalesce);
    ctx.state.buffer = next;
    let len = ctx.state.len();
    ctx.state.selection.move_caret(ins.end, Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(target: "actions.dispatch", op = "insert", offset = at, caret = ins.end, len, "edit");

    ctx.listeners.fire_did_insert(&InsertValueInfo {
        offset: ins.end,
        value: inserted,
    });
    Ok(())
}

/// Outcome of a veto after `inv` was already produced by earlier steps.
pub(super) fn vetoed_after(
    ctx: &mut EditContext<'_>,
    inv: Invalidation,
    content_touched: bool,
) -> EditResult<Invalidation> {
    if content_touched {
        ctx.notify_change();
    }
    if inv.is_empty() {
        return Err(EditError::Vetoed);
    }
    debug!(target: "actions.dispatch", "vetoed_after_partial_apply");
    Ok(inv)
}

/// Delete `range` with the range callback shape (backward, `end` then
/// `start`). `Ok(false)` when nothing was removed.
pub(super) fn delete_range_span(ctx: &mut EditContext<'_>, range: TextRange) -> EditResult<bool> {
    if range.is_empty() {
        return Ok(false);
    }
    delete_span(ctx, DeleteSpan::range(range), false)
}

/// Remove the active selection as the first half of a replacement.
fn delete_selection(ctx: &mut EditContext<'_>) -> EditResult<bool> {
    let sel = ctx.state.selection.range();
    delete_range_span(ctx, sel)
}

pub(crate) fn handle_insert(
    ctx: &mut EditContext<'_>,
    text: &str,
    source: InputSource,
) -> EditResult<Invalidation> {
    let mut inv = preview::finish_implicit(ctx)?;

    let replaced = match delete_selection(ctx) {
        Ok(replaced) => replaced,
        Err(EditError::Vetoed) => return vetoed_after(ctx, inv, false),
        Err(e) => return Err(e),
    };
    if replaced {
        inv |= content_changed();
    }

    let at = ctx.state.selection.caret();
    let sanitized = ctx.state.buffer.sanitize(text, 0);
    if sanitized.is_filtered_empty() {
        debug!(
            target: "actions.dispatch",
            reason = %EditError::FilteredEmpty,
            dropped = sanitized.dropped,
            "insert_filtered_empty"
        );
    }
    if sanitized.truncated {
        debug!(
            target: "actions.dispatch",
            kept = sanitized.text.len(),
            "insert_truncated_at_max_length"
        );
    }
    let coalesce =
        !replaced && source == InputSource::Direct && is_single_cluster(&sanitized.text);
    if !coalesce {
        ctx.state.undo.end_insert_coalescing();
    }
    trace!(target: "actions.dispatch", op = "insert_request", ?source, offset = at, "edit");

    match insert_text(ctx, at, &sanitized.text, coalesce) {
        Ok(()) => {
            ctx.notify_change();
            Ok(inv | content_changed())
        }
        Err(EditError::Vetoed) => vetoed_after(ctx, inv, replaced),
        Err(e) => Err(e),
    }
}

fn handle_delete(
    ctx: &mut EditContext<'_>,
    count: usize,
    direction: Direction,
) -> EditResult<Invalidation> {
    let inv = preview::finish_implicit(ctx)?;

    let span = if ctx.state.selection.has_selection() {
        DeleteSpan::range(ctx.state.selection.range())
    } else {
        let caret = ctx.state.selection.caret();
        let units = ctx.state.buffer.units();
        let target = step_clusters(&units, caret, count, direction);
        if target == caret {
            return Ok(inv);
        }
        match direction {
            Direction::Backward => DeleteSpan {
                start: target,
                end: caret,
                will_offset: caret,
                did_offset: target,
                direction: DeleteDirection::Backward,
            },
            Direction::Forward => DeleteSpan {
                start: caret,
                end: target,
                will_offset: caret,
                did_offset: caret,
                direction: DeleteDirection::Forward,
            },
        }
    };
    let coalesce = direction == Direction::Backward
        && count == 1
        && !ctx.state.selection.has_selection()
        && typing_run_active(ctx.state);

    let outcome = delete_span(ctx, span, coalesce);
    settle_delete(ctx, inv, outcome)
}

fn settle_delete(
    ctx: &mut EditContext<'_>,
    inv: Invalidation,
    outcome: EditResult<bool>,
) -> EditResult<Invalidation> {
    match outcome {
        Ok(true) => {
            ctx.notify_change();
            Ok(inv | content_changed())
        }
        Ok(false) => Ok(inv),
        Err(EditError::Vetoed) => vetoed_after(ctx, inv, false),
        Err(e) => Err(e),
    }
}

pub(crate) fn handle_delete_backward(
    ctx: &mut EditContext<'_>,
    count: usize,
) -> EditResult<Invalidation> {
    handle_delete(ctx, count, Direction::Backward)
}

pub(crate) fn handle_delete_forward(
    ctx: &mut EditContext<'_>,
    count: usize,
) -> EditResult<Invalidation> {
    handle_delete(ctx, count, Direction::Forward)
}

/// Ends falling inside a cluster widen to the whole cluster.
pub(crate) fn handle_delete_range(
    ctx: &mut EditContext<'_>,
    start: usize,
    end: usize,
) -> EditResult<Invalidation> {
    let len = ctx.state.len();
    if start > end || end > len {
        return Err(EditError::invalid_range(start, end, len));
    }
    let inv = preview::finish_implicit(ctx)?;
    let (start, end) = expand_to_clusters(&ctx.state.buffer.units(), start, end);
    let outcome = delete_range_span(ctx, TextRange::new(start, end));
    settle_delete(ctx, inv, outcome)
}

/// Programmatic whole-value replacement. Not a user edit: no `will`/`did`
/// hooks, only the terminal `on_change`. Any composition is dropped.
pub(crate) fn handle_set_value(ctx: &mut EditContext<'_>, text: &str) -> EditResult<Invalidation> {
    let mut inv = content_changed();
    if ctx.state.preview.is_active() {
        inv |= Invalidation::PREVIEW;
    }
    record_undo(ctx.state, false);
    ctx.state.preview.reset();
    let len = ctx.state.buffer.set_all(text);
    ctx.state.selection.move_caret(len, Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(target: "actions.dispatch", op = "set_value", len, "edit");
    ctx.notify_change();
    Ok(inv)
}
