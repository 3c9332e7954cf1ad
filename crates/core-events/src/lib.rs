//! Edit lifecycle payloads, listener registration and repaint hints.
//!
//! Every content-affecting operation fires a fixed sequence of hooks:
//! `will_*` (vetoable) -> `will_change` (vetoable) -> mutation -> `did_*` ->
//! `change`. The sequencer in `core-actions` owns the ordering; this crate only
//! defines the payloads and the fan-out to registered listeners.
//!
//! Clipboard operations add `on_copy`, `on_cut` (after the delete sequence)
//! and `on_paste` (vetoable, ahead of the insert sequence).

use core_text::TextRange;
use tracing::trace;

// -------------------------------------------------------------------------------------------------
// Payloads
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    Backward,
    Forward,
}

/// Origin of an insert request. Informational only; every source goes through
/// the same queue and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Direct,
    Ime,
    Paste,
    AiWrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertValueInfo {
    /// Insertion point for `will`, caret after insertion for `did`.
    pub offset: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteValueInfo {
    /// Caret before deletion for `will`, caret after deletion for `did`.
    pub offset: usize,
    pub direction: DeleteDirection,
    /// Removed text, read before the mutation.
    pub value: String,
}

/// Uncommitted composition text. `offset == None` means no preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewText {
    pub offset: Option<usize>,
    pub value: String,
}

impl PreviewText {
    pub fn at(offset: usize, value: impl Into<String>) -> Self {
        Self {
            offset: Some(offset),
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.offset.is_some()
    }
}

/// Whole-value view of a pending change, passed to `on_will_change`.
///
/// `old_content` and `value` exclude preview text; the preview is described
/// separately so listeners can tell committed content from composition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeValueInfo {
    pub old_content: String,
    pub value: String,
    pub range_before: TextRange,
    pub range_after: TextRange,
    pub old_preview_text: PreviewText,
    pub preview_text: PreviewText,
}

// -------------------------------------------------------------------------------------------------
// Listeners
// -------------------------------------------------------------------------------------------------

/// Vetoable hooks, as reported in veto traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditPhase {
    Paste,
    WillInsert,
    WillDelete,
    WillChange,
}

/// Observer for edit lifecycle hooks. Every method has a permissive default so
/// implementors override only what they need. Returning `false` from a `will`
/// hook vetoes the whole operation.
pub trait EditListener {
    fn on_will_insert(&mut self, _info: &InsertValueInfo) -> bool {
        true
    }
    fn on_did_insert(&mut self, _info: &InsertValueInfo) {}
    fn on_will_delete(&mut self, _info: &DeleteValueInfo) -> bool {
        true
    }
    fn on_did_delete(&mut self, _info: &DeleteValueInfo) {}
    fn on_will_change(&mut self, _info: &ChangeValueInfo) -> bool {
        true
    }
    /// Terminal notification with the committed value and active preview.
    fn on_change(&mut self, _value: &str, _preview: &PreviewText) {}
    fn on_selection_change(&mut self, _start: usize, _end: usize) {}
    /// Selected text was written to the clipboard.
    fn on_copy(&mut self, _value: &str) {}
    /// Selected text was written to the clipboard and deleted.
    fn on_cut(&mut self, _value: &str) {}
    /// Clipboard text about to be inserted; `false` cancels the paste.
    fn on_paste(&mut self, _value: &str) -> bool {
        true
    }
}

type Veto<T> = Box<dyn FnMut(&T) -> bool>;
type Notify<T> = Box<dyn FnMut(&T)>;

/// Closure-backed listener for hosts that register hooks one at a time.
#[derive(Default)]
pub struct EditCallbacks {
    will_insert: Option<Veto<InsertValueInfo>>,
    did_insert: Option<Notify<InsertValueInfo>>,
    will_delete: Option<Veto<DeleteValueInfo>>,
    did_delete: Option<Notify<DeleteValueInfo>>,
    will_change: Option<Veto<ChangeValueInfo>>,
    change: Option<Box<dyn FnMut(&str, &PreviewText)>>,
    selection_change: Option<Box<dyn FnMut(usize, usize)>>,
    copy: Option<Box<dyn FnMut(&str)>>,
    cut: Option<Box<dyn FnMut(&str)>>,
    paste: Option<Box<dyn FnMut(&str) -> bool>>,
}

impl EditCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn will_insert(mut self, f: impl FnMut(&InsertValueInfo) -> bool + 'static) -> Self {
        self.will_insert = Some(Box::new(f));
        self
    }

    pub fn did_insert(mut self, f: impl FnMut(&InsertValueInfo) + 'static) -> Self {
        self.did_insert = Some(Box::new(f));
        self
    }

    pub fn will_delete(mut self, f: impl FnMut(&DeleteValueInfo) -> bool + 'static) -> Self {
        self.will_delete = Some(Box::new(f));
        self
    }

    pub fn did_delete(mut self, f: impl FnMut(&DeleteValueInfo) + 'static) -> Self {
        self.did_delete = Some(Box::new(f));
        self
    }

    pub fn will_change(mut self, f: impl FnMut(&ChangeValueInfo) -> bool + 'static) -> Self {
        self.will_change = Some(Box::new(f));
        self
    }

    pub fn change(mut self, f: impl FnMut(&str, &PreviewText) + 'static) -> Self {
        self.change = Some(Box::new(f));
        self
    }

    pub fn selection_change(mut self, f: impl FnMut(usize, usize) + 'static) -> Self {
        self.selection_change = Some(Box::new(f));
        self
    }

    pub fn copy(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.copy = Some(Box::new(f));
        self
    }

    pub fn cut(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.cut = Some(Box::new(f));
        self
    }

    pub fn paste(mut self, f: impl FnMut(&str) -> bool + 'static) -> Self {
        self.paste = Some(Box::new(f));
        self
    }
}

impl EditListener for EditCallbacks {
    fn on_will_insert(&mut self, info: &InsertValueInfo) -> bool {
        self.will_insert.as_mut().is_none_or(|f| f(info))
    }
    fn on_did_insert(&mut self, info: &InsertValueInfo) {
        if let Some(f) = self.did_insert.as_mut() {
            f(info);
        }
    }
    fn on_will_delete(&mut self, info: &DeleteValueInfo) -> bool {
        self.will_delete.as_mut().is_none_or(|f| f(info))
    }
    fn on_did_delete(&mut self, info: &DeleteValueInfo) {
        if let Some(f) = self.did_delete.as_mut() {
            f(info);
        }
    }
    fn on_will_change(&mut self, info: &ChangeValueInfo) -> bool {
        self.will_change.as_mut().is_none_or(|f| f(info))
    }
    fn on_change(&mut self, value: &str, preview: &PreviewText) {
        if let Some(f) = self.change.as_mut() {
            f(value, preview);
        }
    }
    fn on_selection_change(&mut self, start: usize, end: usize) {
        if let Some(f) = self.selection_change.as_mut() {
            f(start, end);
        }
    }
    fn on_copy(&mut self, value: &str) {
        if let Some(f) = self.copy.as_mut() {
            f(value);
        }
    }
    fn on_cut(&mut self, value: &str) {
        if let Some(f) = self.cut.as_mut() {
            f(value);
        }
    }
    fn on_paste(&mut self, value: &str) -> bool {
        self.paste.as_mut().is_none_or(|f| f(value))
    }
}

/// Ordered set of listeners. `fire_will_*` stop at the first veto so later
/// listeners never observe an operation that will not happen.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Box<dyn EditListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Box<dyn EditListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn veto(
        &mut self,
        phase: EditPhase,
        mut f: impl FnMut(&mut dyn EditListener) -> bool,
    ) -> bool {
        for (idx, l) in self.listeners.iter_mut().enumerate() {
            if !f(l.as_mut()) {
                trace!(target: "actions.dispatch", ?phase, listener = idx, "vetoed");
                return false;
            }
        }
        true
    }

    pub fn fire_will_insert(&mut self, info: &InsertValueInfo) -> bool {
        self.veto(EditPhase::WillInsert, |l| l.on_will_insert(info))
    }

    pub fn fire_did_insert(&mut self, info: &InsertValueInfo) {
        self.listeners.iter_mut().for_each(|l| l.on_did_insert(info));
    }

    pub fn fire_will_delete(&mut self, info: &DeleteValueInfo) -> bool {
        self.veto(EditPhase::WillDelete, |l| l.on_will_delete(info))
    }

    pub fn fire_did_delete(&mut self, info: &DeleteValueInfo) {
        self.listeners.iter_mut().for_each(|l| l.on_did_delete(info));
    }

    pub fn fire_will_change(&mut self, info: &ChangeValueInfo) -> bool {
        self.veto(EditPhase::WillChange, |l| l.on_will_change(info))
    }

    pub fn fire_change(&mut self, value: &str, preview: &PreviewText) {
        self.listeners.iter_mut().for_each(|l| l.on_change(value, preview));
    }

    pub fn fire_selection_change(&mut self, start: usize, end: usize) {
        self.listeners
            .iter_mut()
            .for_each(|l| l.on_selection_change(start, end));
    }

    pub fn fire_copy(&mut self, value: &str) {
        self.listeners.iter_mut().for_each(|l| l.on_copy(value));
    }

    pub fn fire_cut(&mut self, value: &str) {
        self.listeners.iter_mut().for_each(|l| l.on_cut(value));
    }

    pub fn fire_paste(&mut self, value: &str) -> bool {
        self.veto(EditPhase::Paste, |l| l.on_paste(value))
    }
}

// -------------------------------------------------------------------------------------------------
// Repaint hints
// -------------------------------------------------------------------------------------------------

bitflags::bitflags! {
    /// What the host must refresh after a processing pass.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Invalidation: u8 {
        const CONTENT   = 0b0000_0001; // relayout + repaint text
        const SELECTION = 0b0000_0010;
        const CARET     = 0b0000_0100;
        const PREVIEW   = 0b0000_1000; // composition underline
    }
}
