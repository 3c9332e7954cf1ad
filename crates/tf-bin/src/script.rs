//! Replay scripts: a TOML list of edit steps applied to one field.
//!
//! ```toml
//! width = 120.0
//!
//! [[step]]
//! op = "insert"
//! text = "hello"
//! source = "paste"
//!
//! [[step]]
//! op = "select"
//! start = 1
//! end = 3
//! ```

use core_actions::{MenuPolicy, TextField};
use core_events::{
    ChangeValueInfo, DeleteValueInfo, EditListener, InputSource, InsertValueInfo, PreviewText,
};
use core_model::TextLayout;
use core_text::TextRange;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Container width; the command line flag wins when both are given.
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Direct,
    Ime,
    Paste,
    AiWrite,
}

impl From<Source> for InputSource {
    fn from(s: Source) -> Self {
        match s {
            Source::Direct => InputSource::Direct,
            Source::Ime => InputSource::Ime,
            Source::Paste => InputSource::Paste,
            Source::AiWrite => InputSource::AiWrite,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Menu {
    #[default]
    Default,
    Show,
    Hide,
}

impl From<Menu> for MenuPolicy {
    fn from(m: Menu) -> Self {
        match m {
            Menu::Default => MenuPolicy::Default,
            Menu::Show => MenuPolicy::Show,
            Menu::Hide => MenuPolicy::Hide,
        }
    }
}

const fn one() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Insert {
        text: String,
        #[serde(default)]
        source: Source,
    },
    DeleteBackward {
        #[serde(default = "one")]
        count: usize,
    },
    DeleteForward {
        #[serde(default = "one")]
        count: usize,
    },
    DeleteRange {
        start: usize,
        end: usize,
    },
    Select {
        start: usize,
        end: usize,
        #[serde(default)]
        menu: Menu,
    },
    /// Without `start`/`end` the active preview (or selection) is replaced.
    Preview {
        text: String,
        start: Option<usize>,
        end: Option<usize>,
    },
    FinishPreview,
    DiscardPreview,
    SetValue {
        text: String,
    },
    MoveLeft,
    MoveRight,
    MoveLeftWord,
    MoveRightWord,
    LineBegin,
    LineEnd,
    ParagraphBegin,
    ParagraphEnd,
    SelectAll,
    SelectWord {
        offset: usize,
    },
    Click {
        x: f32,
        y: f32,
    },
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    Blur,
    Frame,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::DeleteBackward { .. } => "delete_backward",
            Self::DeleteForward { .. } => "delete_forward",
            Self::DeleteRange { .. } => "delete_range",
            Self::Select { .. } => "select",
            Self::Preview { .. } => "preview",
            Self::FinishPreview => "finish_preview",
            Self::DiscardPreview => "discard_preview",
            Self::SetValue { .. } => "set_value",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::MoveLeftWord => "move_left_word",
            Self::MoveRightWord => "move_right_word",
            Self::LineBegin => "line_begin",
            Self::LineEnd => "line_end",
            Self::ParagraphBegin => "paragraph_begin",
            Self::ParagraphEnd => "paragraph_end",
            Self::SelectAll => "select_all",
            Self::SelectWord { .. } => "select_word",
            Self::Click { .. } => "click",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Blur => "blur",
            Self::Frame => "frame",
        }
    }
}

/// Apply one step and describe its outcome.
pub fn apply<L: TextLayout>(field: &mut TextField<L>, step: &Step) -> String {
    let inv = match step {
        Step::Insert { text, source } => field.insert_value(text, (*source).into()),
        Step::DeleteBackward { count } => field.delete_backward(*count),
        Step::DeleteForward { count } => field.delete_forward(*count),
        Step::DeleteRange { start, end } => field.delete_range(*start, *end),
        Step::Select { start, end, menu } => field.set_selection(*start, *end, (*menu).into()),
        Step::Preview { text, start, end } => {
            let range = match (start, end) {
                (Some(s), Some(e)) => Some(TextRange { start: *s, end: *e }),
                (Some(at), None) | (None, Some(at)) => Some(TextRange::caret(*at)),
                (None, None) => None,
            };
            return format!("status={}", field.set_preview_text(text, range));
        }
        Step::FinishPreview => field.finish_preview(),
        Step::DiscardPreview => field.discard_preview(),
        Step::SetValue { text } => field.set_value(text),
        Step::MoveLeft => return moved(field.cursor_move_left()),
        Step::MoveRight => return moved(field.cursor_move_right()),
        Step::MoveLeftWord => return moved(field.cursor_move_left_word()),
        Step::MoveRightWord => return moved(field.cursor_move_right_word()),
        Step::LineBegin => return moved(field.cursor_move_line_begin()),
        Step::LineEnd => return moved(field.cursor_move_line_end()),
        Step::ParagraphBegin => return moved(field.cursor_move_paragraph_begin()),
        Step::ParagraphEnd => return moved(field.cursor_move_paragraph_end()),
        Step::SelectAll => field.select_all(),
        Step::SelectWord { offset } => field.select_word_at(*offset),
        Step::Click { x, y } => field.place_caret_at_point(*x, *y),
        Step::Copy => field.copy(),
        Step::Cut => field.cut(),
        Step::Paste => field.paste(),
        Step::Undo => field.undo(),
        Step::Redo => field.redo(),
        Step::Blur => field.on_blur(),
        Step::Frame => field.process_frame(),
    };
    format!("{inv:?}")
}

fn moved(m: bool) -> String {
    format!("moved={m}")
}

/// Final state lines printed after the replay.
pub fn summary<L: TextLayout>(field: &TextField<L>) -> Vec<String> {
    let sel = field.selection();
    let caret = field.caret_rect();
    let mut out = vec![
        format!("text: {:?}", field.text_value()),
        format!("committed: {:?}", field.committed_value()),
        format!("caret: {} ({:?})", field.caret_index(), field.affinity()),
        format!("selection: {}..{}", sel.start, sel.end),
        format!(
            "caret_rect: x={} y={} w={} h={}",
            caret.x, caret.y, caret.width, caret.height
        ),
    ];
    let preview = field.preview_text();
    if let Some(offset) = preview.offset {
        out.push(format!("preview: {:?} at {offset}", preview.value));
    }
    out
}

// -------------------------------------------------------------------------------------------------
// Transcript
// -------------------------------------------------------------------------------------------------

/// Shared log of callbacks and step outcomes, in firing order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    pub fn push(&self, line: String) {
        self.lines.borrow_mut().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn listener(&self) -> Box<dyn EditListener> {
        Box::new(TranscriptListener {
            transcript: self.clone(),
        })
    }
}

struct TranscriptListener {
    transcript: Transcript,
}

impl EditListener for TranscriptListener {
    fn on_will_insert(&mut self, info: &InsertValueInfo) -> bool {
        self.transcript
            .push(format!("  will_insert offset={} value={:?}", info.offset, info.value));
        true
    }
    fn on_did_insert(&mut self, info: &InsertValueInfo) {
        self.transcript
            .push(format!("  did_insert offset={} value={:?}", info.offset, info.value));
    }
    fn on_will_delete(&mut self, info: &DeleteValueInfo) -> bool {
        self.transcript.push(format!(
            "  will_delete offset={} direction={:?} value={:?}",
            info.offset, info.direction, info.value
        ));
        true
    }
    fn on_did_delete(&mut self, info: &DeleteValueInfo) {
        self.transcript.push(format!(
            "  did_delete offset={} direction={:?} value={:?}",
            info.offset, info.direction, info.value
        ));
    }
    fn on_will_change(&mut self, info: &ChangeValueInfo) -> bool {
        self.transcript
            .push(format!("  will_change {:?} -> {:?}", info.old_content, info.value));
        true
    }
    fn on_change(&mut self, value: &str, preview: &PreviewText) {
        match preview.offset {
            Some(at) => self
                .transcript
                .push(format!("  change {value:?} preview={:?}@{at}", preview.value)),
            None => self.transcript.push(format!("  change {value:?}")),
        }
    }
    fn on_selection_change(&mut self, start: usize, end: usize) {
        self.transcript.push(format!("  selection_change {start}..{end}"));
    }
    fn on_copy(&mut self, value: &str) {
        self.transcript.push(format!("  copy {value:?}"));
    }
    fn on_cut(&mut self, value: &str) {
        self.transcript.push(format!("  cut {value:?}"));
    }
    fn on_paste(&mut self, value: &str) -> bool {
        self.transcript.push(format!("  paste {value:?}"));
        true
    }
}
