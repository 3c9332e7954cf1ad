#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::TextField;
use core_events::{ChangeValueInfo, DeleteValueInfo, EditListener, InsertValueInfo, PreviewText};
use core_model::FixedAdvanceLayout;
use core_text::ContentPolicy;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

pub type Field = TextField<FixedAdvanceLayout>;
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn layout() -> FixedAdvanceLayout {
    FixedAdvanceLayout::new(10.0, 20.0)
}

pub fn field(width: f32) -> Field {
    TextField::new(layout(), width)
}

pub fn field_with(policy: ContentPolicy) -> Field {
    TextField::with_policy(policy, layout(), 200.0)
}

/// Field holding `text` with the caret at its end.
pub fn field_text(text: &str) -> Field {
    let mut f = field(200.0);
    f.set_value(text);
    f
}

// -------------------------------------------------------------------------------------------------
// Recording listener
// -------------------------------------------------------------------------------------------------

/// Appends one entry per hook: `phase@offset=value` (or `phase=value`).
#[derive(Default)]
pub struct Recorder {
    log: Log,
    veto_insert: bool,
    veto_delete: bool,
    veto_change: bool,
    veto_paste: bool,
}

impl Recorder {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn veto_insert(mut self) -> Self {
        self.veto_insert = true;
        self
    }

    pub fn veto_delete(mut self) -> Self {
        self.veto_delete = true;
        self
    }

    pub fn veto_change(mut self) -> Self {
        self.veto_change = true;
        self
    }

    pub fn veto_paste(mut self) -> Self {
        self.veto_paste = true;
        self
    }

    fn push(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl EditListener for Recorder {
    fn on_will_insert(&mut self, info: &InsertValueInfo) -> bool {
        self.push(format!("will_insert@{}={}", info.offset, info.value));
        !self.veto_insert
    }
    fn on_did_insert(&mut self, info: &InsertValueInfo) {
        self.push(format!("did_insert@{}={}", info.offset, info.value));
    }
    fn on_will_delete(&mut self, info: &DeleteValueInfo) -> bool {
        self.push(format!("will_delete@{}={}", info.offset, info.value));
        !self.veto_delete
    }
    fn on_did_delete(&mut self, info: &DeleteValueInfo) {
        self.push(format!("did_delete@{}={}", info.offset, info.value));
    }
    fn on_will_change(&mut self, info: &ChangeValueInfo) -> bool {
        self.push(format!("will_change={}", info.value));
        !self.veto_change
    }
    fn on_change(&mut self, value: &str, preview: &PreviewText) {
        self.push(format!("change={}|{}", value, preview.value));
    }
    fn on_selection_change(&mut self, start: usize, end: usize) {
        self.push(format!("selection_change@{start}={end}"));
    }
    fn on_copy(&mut self, value: &str) {
        self.push(format!("copy={value}"));
    }
    fn on_cut(&mut self, value: &str) {
        self.push(format!("cut={value}"));
    }
    fn on_paste(&mut self, value: &str) -> bool {
        self.push(format!("paste={value}"));
        !self.veto_paste
    }
}

pub fn record(field: &mut Field) -> Log {
    let log: Log = Rc::default();
    field.add_listener(Box::new(Recorder::new(log.clone())));
    log
}

/// Hook names only, in firing order.
pub fn phases(log: &Log) -> Vec<String> {
    log.borrow()
        .iter()
        .map(|e| e.split(['@', '=']).next().unwrap_or_default().to_string())
        .collect()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

pub fn clear(log: &Log) {
    log.borrow_mut().clear();
}

// -------------------------------------------------------------------------------------------------
// Log capture
// -------------------------------------------------------------------------------------------------

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` under a DEBUG-level subscriber and return what it logged.
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let inner = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: inner.clone(),
        })
        .finish();
    with_default(subscriber, f);
    let bytes = inner.lock().expect("log buffer poisoned").clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
