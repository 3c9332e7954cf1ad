//! Composition (preview text) handlers.
//!
//! `set_preview` is a change of the whole value: only `will_change` is
//! consulted and `on_change` reports the committed value alongside the new
//! preview. `finish` has the shape of an insert of the composition text at
//! the span start. A vetoed finish cannot leave uncommitted text behind, so
//! the composition is rolled back without further callbacks.
//!
//! With previews disabled, a preview request degrades to a plain insert.
//! An explicit range inside the buffer is widened to cluster boundaries.

use super::{EditContext, edit, preview_text};
use core_events::{ChangeValueInfo, InputSource, InsertValueInfo, Invalidation, PreviewText};
use core_model::Affinity;
use core_state::SnapshotKind;
use core_text::{EditError, EditResult, TextRange, expand_to_clusters};
use tracing::{debug, trace};

fn all() -> Invalidation {
    Invalidation::CONTENT | Invalidation::PREVIEW | Invalidation::SELECTION | Invalidation::CARET
}

pub(crate) fn handle_set_preview(
    ctx: &mut EditContext<'_>,
    range: Option<TextRange>,
    text: &str,
) -> EditResult<Invalidation> {
    if !ctx.preview_enabled {
        debug!(target: "actions.dispatch", "preview_disabled_inserting");
        return edit::handle_insert(ctx, text, InputSource::Ime);
    }
    let len = ctx.state.len();
    let range = range.map(|r| {
        if r.start > r.end || r.end > len {
            return r;
        }
        let (start, end) = expand_to_clusters(&ctx.state.buffer.units(), r.start, r.end);
        TextRange { start, end }
    });
    let selection = ctx.state.selection.range();
    let target = ctx.state.preview.resolve_range(range, selection, len)?;

    let mut buffer = ctx.state.buffer.clone();
    let mut preview = ctx.state.preview.clone();
    let caret = preview.set_preview(&mut buffer, target, text)?;
    let change = ChangeValueInfo {
        old_content: ctx.state.committed_value(),
        value: preview.committed_value(&buffer),
        range_before: selection,
        range_after: TextRange::caret(caret),
        old_preview_text: preview_text(ctx.state),
        preview_text: preview.span().map_or_else(PreviewText::default, |span| {
            PreviewText::at(span.start, span.text.clone())
        }),
    };
    if !ctx.listeners.fire_will_change(&change) {
        return Err(EditError::Vetoed);
    }

    ctx.state.undo.end_insert_coalescing();
    ctx.state.buffer = buffer;
    ctx.state.preview = preview;
    let len = ctx.state.len();
    ctx.state.selection.move_caret(caret, Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(
        target: "actions.dispatch",
        op = "set_preview",
        start = target.start,
        end = target.end,
        caret,
        active = ctx.state.preview.is_active(),
        "preview"
    );
    ctx.notify_change();
    Ok(all())
}

/// Commit the active composition. No-op when idle.
pub(crate) fn handle_finish(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    let Some(span) = ctx.state.preview.span().cloned() else {
        return Ok(Invalidation::empty());
    };
    let will = InsertValueInfo {
        offset: span.start,
        value: span.text.clone(),
    };
    if !ctx.listeners.fire_will_insert(&will) {
        return rollback(ctx);
    }
    let change = ChangeValueInfo {
        old_content: ctx.state.committed_value(),
        value: ctx.state.buffer.text(),
        range_before: ctx.state.selection.range(),
        range_after: TextRange::caret(span.end()),
        old_preview_text: PreviewText::at(span.start, span.text.clone()),
        preview_text: PreviewText::default(),
    };
    if !ctx.listeners.fire_will_change(&change) {
        return rollback(ctx);
    }

    let snap = ctx.state.snapshot(SnapshotKind::Edit);
    ctx.state.undo.push_discrete_edit_snapshot(snap);
    ctx.state.preview.finish();
    let len = ctx.state.len();
    ctx.state.selection.move_caret(span.end(), Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(
        target: "actions.dispatch",
        op = "finish_preview",
        start = span.start,
        end = span.end(),
        "preview"
    );

    ctx.listeners.fire_did_insert(&InsertValueInfo {
        offset: span.end(),
        value: span.text,
    });
    ctx.notify_change();
    Ok(all())
}

fn rollback(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    if let Some(caret) = ctx.state.preview.discard(&mut ctx.state.buffer)? {
        let len = ctx.state.len();
        ctx.state.selection.move_caret(caret, Affinity::Downstream, len);
    }
    ctx.state.revalidate();
    debug!(target: "actions.dispatch", op = "finish_preview", "vetoed_composition_discarded");
    Ok(all())
}

/// Roll the composition back and report the restored value.
pub(crate) fn handle_discard(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    let Some(caret) = ctx.state.preview.discard(&mut ctx.state.buffer)? else {
        return Ok(Invalidation::empty());
    };
    let len = ctx.state.len();
    ctx.state.selection.move_caret(caret, Affinity::Downstream, len);
    ctx.state.revalidate();
    trace!(target: "actions.dispatch", op = "discard_preview", caret, "preview");
    ctx.notify_change();
    Ok(all())
}

/// Commit any composition ahead of a direct edit.
pub(crate) fn finish_implicit(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    if !ctx.state.preview.is_active() {
        return Ok(Invalidation::empty());
    }
    trace!(target: "actions.dispatch", op = "finish_preview", "implicit");
    handle_finish(ctx)
}
