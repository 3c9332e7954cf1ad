mod common;

use common::*;
use core_events::InputSource;
use core_text::{ContentPolicy, FilterMode, InputFilter, InputType};
use pretty_assertions::assert_eq;

const MIXED: &str = "CabcdefgABhCDEFG0123a456A789";

fn filtered(pattern: &str, mode: FilterMode) -> Field {
    field_with(ContentPolicy {
        filter: Some(InputFilter::new(pattern, mode).unwrap()),
        ..ContentPolicy::default()
    })
}

fn typed(input_type: InputType) -> Field {
    field_with(ContentPolicy {
        input_type,
        ..ContentPolicy::default()
    })
}

#[test]
fn allow_filter_keeps_matching_clusters() {
    let mut digits = filtered("[0-9]", FilterMode::Allow);
    digits.insert_value(MIXED, InputSource::Paste);
    assert_eq!(digits.text_value(), "0123456789");
    assert_eq!(digits.caret_index(), 10);

    let mut upper = filtered("[A-Z]", FilterMode::Allow);
    upper.insert_value(MIXED, InputSource::Paste);
    assert_eq!(upper.text_value(), "CABCDEFGA");
}

#[test]
fn deny_filter_drops_matching_clusters() {
    let mut f = filtered("[0-9]", FilterMode::Deny);
    f.insert_value(MIXED, InputSource::Paste);
    assert_eq!(f.text_value(), "CabcdefgABhCDEFGaA");
}

#[test]
fn decimal_mode_keeps_first_point_only() {
    let mut f = typed(InputType::NumberDecimal);
    f.insert_value("3.1.4.", InputSource::Paste);
    assert_eq!(f.text_value(), "3.14");
    assert_eq!(f.caret_index(), 4);
    f.insert_value(".", InputSource::Direct);
    assert_eq!(f.text_value(), "3.14");
}

#[test]
fn dropped_points_leave_room_under_max_length() {
    let mut f = field_with(ContentPolicy {
        max_length: Some(4),
        input_type: InputType::NumberDecimal,
        ..ContentPolicy::default()
    });
    f.insert_value("3.1.4.", InputSource::Paste);
    assert_eq!(f.text_value(), "3.14");
    assert_eq!(f.caret_index(), 4);
}

#[test]
fn number_and_phone_types_filter_before_the_user_regex() {
    let mut n = typed(InputType::Number);
    n.insert_value("12ab3", InputSource::Direct);
    assert_eq!(n.text_value(), "123");

    let mut p = typed(InputType::Phone);
    p.insert_value("+1 (555) 010-99x", InputSource::Paste);
    assert_eq!(p.text_value(), "+1 (555) 010-99");
}

#[test]
fn email_type_collapses_repeated_at_sign() {
    let mut f = typed(InputType::Email);
    f.insert_value("a b@c@d", InputSource::Paste);
    assert_eq!(f.text_value(), "ab@cd");
}

#[test]
fn set_value_applies_the_same_policy() {
    let mut f = filtered("[0-9]", FilterMode::Allow);
    f.set_value("a1b2");
    assert_eq!(f.text_value(), "12");
    assert_eq!(f.caret_index(), 2);
}
