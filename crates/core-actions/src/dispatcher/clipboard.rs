//! Clipboard handlers.
//!
//! * copy:  clipboard write -> `on_copy`
//! * cut:   delete sequence over the selection (`will_delete` ->
//!   `will_change` -> mutate -> `did_delete`) -> clipboard write -> `on_cut`
//!   -> `on_change`
//! * paste: clipboard read -> `on_paste` (vetoable) -> insert sequence with
//!   `InputSource::Paste`
//!
//! Copy and cut need a selection. Both are refused, silently, when the copy
//! options are `None` or the field holds a password.

use super::{EditContext, content_changed, edit, preview};
use core_events::{InputSource, Invalidation};
use core_text::{EditError, EditResult};
use tracing::{debug, trace};

fn copy_refused(ctx: &EditContext<'_>, op: &'static str) -> bool {
    let input_type = ctx.state.buffer.policy().input_type;
    let refused = !ctx.copy_options.allows_copy() || !input_type.allows_copy();
    if refused {
        debug!(
            target: "actions.dispatch",
            op,
            copy_options = ?ctx.copy_options,
            ?input_type,
            "clipboard_refused"
        );
    }
    refused
}

pub(crate) fn handle_copy(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    let sel = ctx.state.selection.range();
    if sel.is_empty() || copy_refused(ctx, "copy") {
        return Ok(Invalidation::empty());
    }
    let value = ctx.state.buffer.slice(sel.start, sel.end)?;
    ctx.clipboard.write(&value);
    trace!(target: "actions.dispatch", op = "copy", start = sel.start, end = sel.end, "clipboard");
    ctx.listeners.fire_copy(&value);
    Ok(Invalidation::empty())
}

pub(crate) fn handle_cut(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    // Committing a composition moves only the caret, so the range stays valid.
    let sel = ctx.state.selection.range();
    if sel.is_empty() || copy_refused(ctx, "cut") {
        return Ok(Invalidation::empty());
    }
    let inv = preview::finish_implicit(ctx)?;
    let value = ctx.state.buffer.slice(sel.start, sel.end)?;
    match edit::delete_range_span(ctx, sel) {
        Ok(true) => {}
        Ok(false) => return Ok(inv),
        Err(EditError::Vetoed) => return edit::vetoed_after(ctx, inv, false),
        Err(e) => return Err(e),
    }
    ctx.clipboard.write(&value);
    trace!(target: "actions.dispatch", op = "cut", start = sel.start, end = sel.end, "clipboard");
    ctx.listeners.fire_cut(&value);
    ctx.notify_change();
    Ok(inv | content_changed())
}

pub(crate) fn handle_paste(ctx: &mut EditContext<'_>) -> EditResult<Invalidation> {
    let Some(value) = ctx.clipboard.read().filter(|v| !v.is_empty()) else {
        trace!(target: "actions.dispatch", op = "paste", "clipboard_empty");
        return Ok(Invalidation::empty());
    };
    if !ctx.listeners.fire_paste(&value) {
        return Err(EditError::Vetoed);
    }
    edit::handle_insert(ctx, &value, InputSource::Paste)
}
