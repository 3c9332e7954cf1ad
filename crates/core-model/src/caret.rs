//! Offset to caret rectangle resolution.
//!
//! The caret at `offset` sits on an edge of one of two clusters: the one
//! ending at `offset` (upstream) or the one starting there (downstream).
//! Which edge depends on the direction of that cluster's run:
//!
//! | side       | LTR cluster | RTL cluster |
//! |------------|-------------|-------------|
//! | upstream   | right edge  | left edge   |
//! | downstream | left edge   | right edge  |
//!
//! Inside a single-direction line both sides coincide; they differ at bidi
//! boundaries and soft wraps, which is what `Affinity` disambiguates. A hard
//! break never serves as the upstream cluster, so the caret after `\n` always
//! renders at the start of the following line.
//!
//! Empty content does not consult glyph metrics; the caret is anchored by
//! text alignment and paragraph direction.

use crate::{Affinity, LineMetrics, Rect, TextAlign, TextDirection, TextLayout};
use core_text::{Direction, EditError, EditResult, cluster_len};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CaretGeometryResolver {
    caret_width: f32,
    align: TextAlign,
    // Last successfully resolved rect, used when layout degenerates.
    proto: Option<Rect>,
}

impl Default for CaretGeometryResolver {
    fn default() -> Self {
        Self::new(2.0, TextAlign::Start)
    }
}

fn usable(height: f32) -> bool {
    height.is_finite() && height > 0.0
}

fn edge(m: &LineMetrics, affinity: Affinity) -> f32 {
    match (affinity, m.direction) {
        (Affinity::Upstream, TextDirection::Ltr) | (Affinity::Downstream, TextDirection::Rtl) => {
            m.rect.right()
        }
        _ => m.rect.x,
    }
}

impl CaretGeometryResolver {
    pub fn new(caret_width: f32, align: TextAlign) -> Self {
        Self {
            caret_width,
            align,
            proto: None,
        }
    }

    pub fn caret_width(&self) -> f32 {
        self.caret_width
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    pub fn proto(&self) -> Option<Rect> {
        self.proto
    }

    /// Caret rect for empty content.
    pub fn anchor<L: TextLayout + ?Sized>(&self, layout: &L) -> EditResult<Rect> {
        let height = layout.default_line_height();
        if !usable(height) {
            return Err(EditError::DegenerateLayout);
        }
        let right = (layout.width() - self.caret_width).max(0.0);
        let x = match (self.align, layout.paragraph_direction()) {
            (TextAlign::Start, TextDirection::Ltr) | (TextAlign::End, TextDirection::Rtl) => 0.0,
            (TextAlign::Start, TextDirection::Rtl) | (TextAlign::End, TextDirection::Ltr) => right,
            (TextAlign::Center | TextAlign::Justify, _) => right / 2.0,
        };
        Ok(Rect::new(x, 0.0, 0.0, height))
    }

    /// Resolve the caret rect at `offset` within `units`.
    pub fn resolve<L: TextLayout + ?Sized>(
        &self,
        layout: &L,
        units: &[u16],
        offset: usize,
        affinity: Affinity,
    ) -> EditResult<Rect> {
        if offset > units.len() {
            return Err(EditError::invalid_range(offset, offset, units.len()));
        }
        if units.is_empty() {
            return self.anchor(layout);
        }
        let after = layout.line_metrics(offset);
        let before = match cluster_len(units, offset, Direction::Backward) {
            0 => None,
            _ if matches!(char::from_u32(u32::from(units[offset - 1])), Some('\n' | '\r')) => None,
            n => layout.line_metrics(offset - n),
        };
        let (metrics, side) = match (before, after, affinity) {
            (Some(b), _, Affinity::Upstream) | (Some(b), None, _) => (b, Affinity::Upstream),
            (_, Some(a), _) => (a, Affinity::Downstream),
            (None, None, _) => return Err(EditError::DegenerateLayout),
        };
        if !usable(metrics.line_height) {
            debug!(target: "model.caret", offset, height = metrics.line_height, "degenerate_line");
            return Err(EditError::DegenerateLayout);
        }
        let max_x = (layout.width() - self.caret_width).max(0.0);
        let x = edge(&metrics, side).clamp(0.0, max_x);
        Ok(Rect::new(x, metrics.rect.y, self.caret_width, metrics.line_height))
    }

    /// Like [`resolve`](Self::resolve) but never fails: degenerate layouts fall
    /// back to the last good rect (or a zero rect before any succeeded).
    pub fn resolve_or_cached<L: TextLayout + ?Sized>(
        &mut self,
        layout: &L,
        units: &[u16],
        offset: usize,
        affinity: Affinity,
    ) -> Rect {
        match self.resolve(layout, units, offset, affinity) {
            Ok(rect) => {
                self.proto = Some(rect);
                rect
            }
            Err(err) => {
                debug!(target: "model.caret", offset, code = err.code(), "fallback_proto");
                self.proto.unwrap_or_default()
            }
        }
    }

    /// Caret placement for a click at `click_x` that hit-tested to `offset`:
    /// the candidate whose x is closer to the click wins, ties go upstream.
    pub fn resolve_for_click<L: TextLayout + ?Sized>(
        &self,
        layout: &L,
        units: &[u16],
        offset: usize,
        click_x: f32,
    ) -> EditResult<(Rect, Affinity)> {
        let down = self.resolve(layout, units, offset, Affinity::Downstream)?;
        let up = match self.resolve(layout, units, offset, Affinity::Upstream) {
            Ok(r) => r,
            Err(_) => return Ok((down, Affinity::Downstream)),
        };
        if (up.x - click_x).abs() <= (down.x - click_x).abs() {
            Ok((up, Affinity::Upstream))
        } else {
            Ok((down, Affinity::Downstream))
        }
    }
}
