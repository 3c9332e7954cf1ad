//! Clipboard seam and the copy policy that gates it.
//!
//! The field never talks to a platform clipboard directly: hosts plug one in
//! through [`Clipboard`]. [`LocalClipboard`] is an in-process slot whose
//! clones share content, so several fields (or a test) can observe the same
//! clipboard.

use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Where selected text may be copied to. `None` disables copy and cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOptions {
    None,
    InApp,
    #[default]
    Local,
    Distributed,
}

impl CopyOptions {
    pub fn allows_copy(self) -> bool {
        self != Self::None
    }
}

pub trait Clipboard {
    fn write(&mut self, text: &str);
    fn read(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct LocalClipboard {
    slot: Rc<RefCell<Option<String>>>,
}

impl LocalClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for LocalClipboard {
    fn write(&mut self, text: &str) {
        trace!(target: "state.clipboard", len = text.len(), "write");
        *self.slot.borrow_mut() = Some(text.to_owned());
    }

    fn read(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_slot() {
        let mut a = LocalClipboard::new();
        let b = a.clone();
        assert_eq!(b.read(), None);
        a.write("hello");
        assert_eq!(b.read().as_deref(), Some("hello"));
    }

    #[test]
    fn only_none_blocks_copy() {
        assert!(!CopyOptions::None.allows_copy());
        assert!(CopyOptions::InApp.allows_copy());
        assert!(CopyOptions::default().allows_copy());
    }
}
