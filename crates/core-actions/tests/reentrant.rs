mod common;

use common::*;
use core_actions::PendingOperation;
use core_events::{EditCallbacks, InputSource};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn edit_submitted_from_callback_runs_after_current_operation() {
    let mut f = field(200.0);
    let log = record(&mut f);
    let tx = f.sender();
    let fired = Rc::new(Cell::new(false));
    let once = fired.clone();
    f.add_listener(Box::new(EditCallbacks::new().change(move |_, _| {
        if !once.replace(true) {
            tx.submit(PendingOperation::insert("!"));
        }
    })));

    f.insert_value("a", InputSource::Direct);
    assert_eq!(
        entries(&log),
        [
            "will_insert@0=a",
            "will_change=a",
            "did_insert@1=a",
            "change=a|",
            "will_insert@1=!",
            "will_change=a!",
            "did_insert@2=!",
            "change=a!|",
        ]
    );
    assert_eq!(f.text_value(), "a!");
    assert_eq!(f.sequencer().pending(), 0);
}

#[test]
fn submissions_from_will_hooks_are_appended_not_interleaved() {
    let mut f = field(200.0);
    let log = record(&mut f);
    let tx = f.sender();
    let fired = Rc::new(Cell::new(false));
    let once = fired.clone();
    f.add_listener(Box::new(EditCallbacks::new().will_insert(move |_| {
        if !once.replace(true) {
            tx.submit(PendingOperation::DeleteBackward(1));
        }
        true
    })));

    f.insert_value("ab", InputSource::Paste);
    assert_eq!(
        phases(&log),
        [
            "will_insert",
            "will_change",
            "did_insert",
            "change",
            "will_delete",
            "will_change",
            "did_delete",
            "change",
        ]
    );
    assert_eq!(f.text_value(), "a");
}

#[test]
fn operations_run_in_submission_order() {
    let mut f = field(200.0);
    let tx = f.sender();
    for piece in ["a", "b", "c"] {
        tx.submit(PendingOperation::insert(piece));
    }
    tx.submit(PendingOperation::DeleteRange { start: 0, end: 1 });
    f.process_frame();
    assert_eq!(f.text_value(), "bc");
}
