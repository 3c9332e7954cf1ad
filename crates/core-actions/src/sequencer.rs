//! Single FIFO queue serializing every edit request for one field.
//!
//! Requests arrive through `submit` or through an [`OperationSender`] clone
//! held by a listener. `drain` applies queued operations one at a time; a
//! listener that submits during an operation only appends, so its request
//! runs after the current operation's callbacks have all fired.
//!
//! A `SetPreview` popped after a content mutation in the same pass waits for
//! the next `process_frame`, as does everything queued behind it, so the
//! relative order of requests is never changed.

use crate::dispatcher::{self, EditContext};
use crate::{MenuPolicy, PendingOperation};
use core_events::{EditListener, Invalidation, ListenerRegistry};
use core_state::{Clipboard, CopyOptions, FieldState, LocalClipboard};
use core_text::EditError;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Cloneable handle for submitting operations from inside callbacks.
#[derive(Debug, Clone)]
pub struct OperationSender {
    tx: Sender<PendingOperation>,
}

impl OperationSender {
    /// Append `op` to the queue. Returns false once the field is gone.
    pub fn submit(&self, op: PendingOperation) -> bool {
        self.tx.send(op).is_ok()
    }
}

pub struct EditSequencer {
    state: FieldState,
    listeners: ListenerRegistry,
    clipboard: Box<dyn Clipboard>,
    copy_options: CopyOptions,
    tx: Sender<PendingOperation>,
    rx: Receiver<PendingOperation>,
    deferred: VecDeque<PendingOperation>,
    preview_enabled: bool,
    preview_status: i32,
    menu: MenuPolicy,
}

impl EditSequencer {
    pub fn new(state: FieldState) -> Self {
        let (tx, rx) = unbounded();
        Self {
            state,
            listeners: ListenerRegistry::new(),
            clipboard: Box::new(LocalClipboard::new()),
            copy_options: CopyOptions::default(),
            tx,
            rx,
            deferred: VecDeque::new(),
            preview_enabled: true,
            preview_status: 0,
            menu: MenuPolicy::Default,
        }
    }

    pub fn with_preview_enabled(mut self, enabled: bool) -> Self {
        self.preview_enabled = enabled;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn with_copy_options(mut self, options: CopyOptions) -> Self {
        self.copy_options = options;
        self
    }

    pub fn set_copy_options(&mut self, options: CopyOptions) {
        self.copy_options = options;
    }

    pub fn copy_options(&self) -> CopyOptions {
        self.copy_options
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// Direct state access for operations that fire no content callbacks
    /// (caret movement).
    pub fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    pub fn register(&mut self, listener: Box<dyn EditListener>) {
        self.listeners.register(listener);
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    pub fn sender(&self) -> OperationSender {
        OperationSender { tx: self.tx.clone() }
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    /// Status of the most recent preview operation: 0 on success or when it
    /// was queued, otherwise the error code.
    pub fn preview_status(&self) -> i32 {
        self.preview_status
    }

    /// Menu policy of the most recent explicit selection.
    pub fn menu_policy(&self) -> MenuPolicy {
        self.menu
    }

    /// Operations waiting in the queue or deferred to the next frame.
    pub fn pending(&self) -> usize {
        self.rx.len() + self.deferred.len()
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Append without applying.
    pub fn enqueue(&self, op: PendingOperation) {
        if self.tx.send(op).is_err() {
            warn!(target: "actions.sequencer", "queue_closed");
        }
    }

    /// Append `op` and drain the queue.
    pub fn submit(&mut self, op: PendingOperation) -> Invalidation {
        if op.is_preview() {
            self.preview_status = 0;
        }
        self.enqueue(op);
        self.drain()
    }

    /// Apply queued operations in order until the queue is empty.
    pub fn drain(&mut self) -> Invalidation {
        let mut inv = Invalidation::empty();
        let mut mutated = false;
        while let Ok(op) = self.rx.try_recv() {
            if !self.deferred.is_empty() || (mutated && op.is_preview()) {
                debug!(
                    target: "actions.sequencer",
                    op = op.name(),
                    deferred = self.deferred.len(),
                    "deferred_to_next_frame"
                );
                self.deferred.push_back(op);
                continue;
            }
            let applied = self.apply(op);
            mutated |= applied.contains(Invalidation::CONTENT);
            inv |= applied;
        }
        inv
    }

    /// Frame tick: run operations deferred by the previous pass, then any
    /// they queued.
    pub fn process_frame(&mut self) -> Invalidation {
        let mut inv = Invalidation::empty();
        while let Some(op) = self.deferred.pop_front() {
            inv |= self.apply(op);
        }
        inv | self.drain()
    }

    fn apply(&mut self, op: PendingOperation) -> Invalidation {
        let name = op.name();
        let is_preview = op.is_preview();
        let menu = match &op {
            PendingOperation::SetSelection { menu, .. } => Some(*menu),
            _ => None,
        };
        let mut ctx = EditContext {
            state: &mut self.state,
            listeners: &mut self.listeners,
            clipboard: self.clipboard.as_mut(),
            copy_options: self.copy_options,
            preview_enabled: self.preview_enabled,
        };
        let result = dispatcher::dispatch(op, &mut ctx);
        match result {
            Ok(inv) => {
                if let Some(menu) = menu {
                    self.menu = menu;
                }
                if is_preview {
                    self.preview_status = 0;
                }
                trace!(
                    target: "actions.sequencer",
                    op = name,
                    invalidation = ?inv,
                    len = self.state.len(),
                    "applied"
                );
                inv
            }
            Err(EditError::Vetoed) => {
                debug!(target: "actions.sequencer", op = name, "vetoed");
                Invalidation::empty()
            }
            Err(e) => {
                debug!(
                    target: "actions.sequencer",
                    op = name,
                    code = e.code(),
                    error = %e,
                    "rejected"
                );
                if is_preview {
                    self.preview_status = e.code();
                }
                Invalidation::empty()
            }
        }
    }
}
