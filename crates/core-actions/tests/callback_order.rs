mod common;

use common::*;
use core_actions::MenuPolicy;
use core_events::{ChangeValueInfo, EditCallbacks, InputSource, Invalidation};
use core_text::{ContentPolicy, FilterMode, InputFilter, TextRange};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn insert_into_empty_fires_four_hooks() {
    let mut f = field(200.0);
    let log = record(&mut f);
    let inv = f.insert_value("a", InputSource::Direct);
    assert_eq!(phases(&log), ["will_insert", "will_change", "did_insert", "change"]);
    assert_eq!(entries(&log), ["will_insert@0=a", "will_change=a", "did_insert@1=a", "change=a|"]);
    assert!(inv.contains(Invalidation::CONTENT | Invalidation::CARET));
    assert_eq!(f.caret_index(), 1);
}

#[test]
fn typing_over_selection_deletes_then_inserts_with_one_change() {
    let mut f = field_text("hello");
    f.set_selection(1, 3, MenuPolicy::Default);
    let log = record(&mut f);
    f.insert_value("x", InputSource::Direct);
    assert_eq!(
        phases(&log),
        [
            "will_delete",
            "will_change",
            "did_delete",
            "will_insert",
            "will_change",
            "did_insert",
            "change",
        ]
    );
    assert_eq!(
        entries(&log),
        [
            "will_delete@3=el",
            "will_change=hlo",
            "did_delete@1=el",
            "will_insert@1=x",
            "will_change=hxlo",
            "did_insert@2=x",
            "change=hxlo|",
        ]
    );
    assert_eq!(f.text_value(), "hxlo");
    assert_eq!(f.selection(), TextRange::caret(2));
}

#[test]
fn delete_payloads_carry_offsets_and_removed_text() {
    let mut f = field_text("abc");
    let log = record(&mut f);
    f.delete_backward(1);
    assert_eq!(
        entries(&log),
        ["will_delete@3=c", "will_change=ab", "did_delete@2=c", "change=ab|"]
    );

    clear(&log);
    f.set_caret_position(0);
    f.delete_forward(1);
    assert_eq!(
        entries(&log),
        ["will_delete@0=a", "will_change=b", "did_delete@0=a", "change=b|"]
    );
    assert_eq!(f.caret_index(), 0);
}

#[test]
fn delete_range_reports_backward_from_end() {
    let mut f = field_text("abcdef");
    let log = record(&mut f);
    f.delete_range(1, 4);
    assert_eq!(
        entries(&log),
        ["will_delete@4=bcd", "will_change=aef", "did_delete@1=bcd", "change=aef|"]
    );
    assert_eq!(f.caret_index(), 1);
}

#[test]
fn delete_range_out_of_bounds_is_rejected_silently() {
    let mut f = field_text("abc");
    let log = record(&mut f);
    assert!(f.delete_range(2, 9).is_empty());
    assert!(f.delete_range(2, 1).is_empty());
    assert!(entries(&log).is_empty());
    assert_eq!(f.text_value(), "abc");
}

#[test]
fn will_change_sees_ranges_before_and_after() {
    let mut f = field_text("a");
    let seen: Rc<RefCell<Vec<ChangeValueInfo>>> = Rc::default();
    let sink = seen.clone();
    f.add_listener(Box::new(EditCallbacks::new().will_change(move |info| {
        sink.borrow_mut().push(info.clone());
        true
    })));
    f.insert_value("b", InputSource::Direct);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].old_content, "a");
    assert_eq!(seen[0].value, "ab");
    assert_eq!(seen[0].range_before, TextRange::caret(1));
    assert_eq!(seen[0].range_after, TextRange::caret(2));
    assert!(!seen[0].preview_text.is_active());
}

#[test]
fn set_value_fires_change_only() {
    let mut f = field(200.0);
    let log = record(&mut f);
    f.set_value("hello");
    assert_eq!(entries(&log), ["change=hello|"]);
    assert_eq!(f.selection(), TextRange::caret(5));
}

#[test]
fn filtered_empty_insert_still_fires_full_sequence() {
    let policy = ContentPolicy {
        filter: Some(InputFilter::new("[0-9]", FilterMode::Allow).unwrap()),
        ..ContentPolicy::default()
    };
    let mut f = field_with(policy);
    let log = record(&mut f);
    f.insert_value("abc", InputSource::Direct);
    assert_eq!(entries(&log), ["will_insert@0=", "will_change=", "did_insert@0=", "change=|"]);
    assert_eq!(f.text_value(), "");
}

#[test]
fn explicit_selection_fires_selection_change_only() {
    let mut f = field_text("hello");
    let log = record(&mut f);
    let inv = f.set_selection(4, 1, MenuPolicy::Hide);
    assert_eq!(entries(&log), ["selection_change@1=4"]);
    assert_eq!(inv, Invalidation::SELECTION | Invalidation::CARET);
    assert_eq!(f.caret_index(), 1);
    assert_eq!(f.sequencer().menu_policy(), MenuPolicy::Hide);
}
