//! The paragraph layout capability consumed by selection and caret code.
//!
//! Contract:
//! * Offsets are UTF-16 code units into the text last passed to `layout`.
//! * `line_metrics(offset)` describes the cluster that *starts* at `offset`
//!   (or contains it, for offsets inside a cluster). At `offset == len` it
//!   describes a zero-width insertion point after the last cluster, which
//!   sits on a fresh line when the text ends with a hard break.
//! * A hard break cluster (`\n`, `\r\n`) reports a zero-width rect at the end
//!   of the line it terminates.
//! * Every query is answered against the most recent `layout` call. Callers
//!   must re-run `layout` after any content or width change.

use crate::{Rect, TextDirection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Box of the cluster on its line.
    pub rect: Rect,
    /// Direction of the run containing the cluster.
    pub direction: TextDirection,
    pub line_height: f32,
}

pub trait TextLayout {
    fn layout(&mut self, text: &str, width: f32);

    fn line_metrics(&self, offset: usize) -> Option<LineMetrics>;

    /// Word (or whitespace/punctuation run) containing `offset`.
    fn word_boundary(&self, offset: usize) -> (usize, usize);

    /// Visual line containing `offset`, excluding its terminating break.
    fn line_boundary(&self, offset: usize) -> (usize, usize);

    fn offset_for_point(&self, x: f32, y: f32) -> usize;

    /// Highlight boxes covering `[start, end)`, merged per line.
    fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect>;

    fn width(&self) -> f32;

    fn default_line_height(&self) -> f32;

    fn paragraph_direction(&self) -> TextDirection;
}
