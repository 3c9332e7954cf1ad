//! Geometry model for the editing surface.
//!
//! Everything in this crate is read-only with respect to content: the
//! paragraph layout is an external collaborator described by [`TextLayout`],
//! and [`CaretGeometryResolver`] only derives rectangles from it. Rectangles
//! are never persisted across layout passes; callers recompute them after
//! every content or width change.
//!
//! Coordinates are in layout units with the origin at the top-left corner of
//! the text area. `x` grows to the right, `y` grows downward.
//!
//! Modules:
//! * `layout` - the `TextLayout` capability and its `LineMetrics` payload.
//! * `caret` - offset to caret rectangle resolution (affinity, bidi, anchors).
//! * `fixed` - `FixedAdvanceLayout`, a deterministic layout used by tests and
//!   the replay tool.

use serde::Deserialize;

pub mod caret;
pub mod fixed;
mod layout;

pub use caret::CaretGeometryResolver;
pub use fixed::FixedAdvanceLayout;
pub use layout::{LineMetrics, TextLayout};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Which side of an ambiguous offset the caret renders on.
///
/// `Upstream` binds to the character before the offset, `Downstream` to the
/// character after it. The two only differ at bidi boundaries and at soft
/// line wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    Upstream,
    #[default]
    Downstream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Center,
    Justify,
}
