//! Edit operations, their sequencing, and the text field facade.
//!
//! Every content or selection request becomes a [`PendingOperation`] on one
//! FIFO queue owned by [`EditSequencer`]. Operations run to completion (all
//! callbacks included) before the next starts; a listener that submits more
//! work through an [`OperationSender`] has it appended, never interleaved.
//!
//! [`TextField`] wires the sequencer to a `TextLayout`, relayouts after
//! content changes, and exposes movement and geometry queries.

use core_events::InputSource;
use core_text::TextRange;

mod dispatcher;
mod field;
mod sequencer;

pub use field::TextField;
pub use sequencer::{EditSequencer, OperationSender};

/// Context-menu request accompanying an explicit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuPolicy {
    #[default]
    Default,
    Show,
    Hide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOperation {
    Insert { text: String, source: InputSource },
    DeleteBackward(usize),
    DeleteForward(usize),
    DeleteRange { start: usize, end: usize },
    /// `range == None` replaces the active preview, or the selection when idle.
    SetPreview { range: Option<TextRange>, text: String },
    FinishPreview,
    DiscardPreview,
    SetSelection { start: usize, end: usize, menu: MenuPolicy },
    SetValue(String),
    /// Copy the selection to the clipboard.
    Copy,
    /// Copy the selection to the clipboard, then delete it.
    Cut,
    /// Insert the clipboard content as `InputSource::Paste`.
    Paste,
    Undo,
    Redo,
}

impl PendingOperation {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::Insert {
            text: text.into(),
            source: InputSource::Direct,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::DeleteBackward(_) => "delete_backward",
            Self::DeleteForward(_) => "delete_forward",
            Self::DeleteRange { .. } => "delete_range",
            Self::SetPreview { .. } => "set_preview",
            Self::FinishPreview => "finish_preview",
            Self::DiscardPreview => "discard_preview",
            Self::SetSelection { .. } => "set_selection",
            Self::SetValue(_) => "set_value",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Self::SetPreview { .. })
    }
}
