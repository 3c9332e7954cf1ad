use super::EditContext;
use crate::MenuPolicy;
use core_events::Invalidation;
use core_text::EditResult;
use tracing::trace;

/// Explicit selection. Out-of-range offsets clamp, ends inside a cluster
/// snap outward (a collapsed caret snaps to the cluster start), and
/// `start > end` selects backwards (the caret ends at `end`).
pub(crate) fn handle_set_selection(
    ctx: &mut EditContext<'_>,
    start: usize,
    end: usize,
    menu: MenuPolicy,
) -> EditResult<Invalidation> {
    let units = ctx.state.buffer.units();
    ctx.state.undo.end_insert_coalescing();
    ctx.state.selection.set_selection(start, end, &units);
    let range = ctx.state.selection.range();
    trace!(
        target: "actions.dispatch",
        op = "set_selection",
        start = range.start,
        end = range.end,
        ?menu,
        "selection"
    );
    ctx.listeners.fire_selection_change(range.start, range.end);
    Ok(Invalidation::SELECTION | Invalidation::CARET)
}
