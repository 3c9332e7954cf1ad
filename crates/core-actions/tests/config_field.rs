mod common;

use common::*;
use core_actions::TextField;
use core_events::InputSource;
use core_state::FocusLossPolicy;
use pretty_assertions::assert_eq;

fn field_from(toml: &str) -> anyhow::Result<Field> {
    let tmp = tempfile::NamedTempFile::new()?;
    std::fs::write(tmp.path(), toml)?;
    let cfg = core_config::load_from(Some(tmp.path().to_path_buf()))?;
    Ok(TextField::from_config(&cfg, layout(), 100.0))
}

#[test]
fn field_policy_comes_from_config() -> anyhow::Result<()> {
    let mut f =
        field_from("[field]\nmax_length = 4\ninput_type = \"number\"\n[caret]\nwidth = 3.0\n")?;
    f.insert_value("12ab345", InputSource::Paste);
    assert_eq!(f.text_value(), "1234");
    assert_eq!(f.caret_rect().width, 3.0);
    Ok(())
}

#[test]
fn disabled_preview_inserts_directly() -> anyhow::Result<()> {
    let mut f = field_from("[preview]\nenabled = false\n")?;
    assert_eq!(f.set_preview_text("ni", None), 0);
    assert_eq!(f.text_value(), "ni");
    assert!(!f.preview_text().is_active());
    Ok(())
}

#[test]
fn focus_policy_comes_from_config() -> anyhow::Result<()> {
    let mut f = field_from("[preview]\non_focus_loss = \"discard\"\n")?;
    f.set_value("ab");
    f.set_preview_text("xy", None);
    f.on_blur();
    assert_eq!(f.text_value(), "ab");

    let mut keep = field_from("")?;
    keep.set_preview_text("xy", None);
    keep.on_blur();
    assert!(keep.preview_text().is_active());
    keep.set_focus_loss_policy(FocusLossPolicy::Commit);
    keep.on_blur();
    assert_eq!(keep.committed_value(), "xy");
    Ok(())
}

#[test]
fn small_undo_history_drops_oldest_steps() -> anyhow::Result<()> {
    let mut f = field_from("[undo]\nhistory = 2\n")?;
    for piece in ["a", "b", "c", "d"] {
        f.insert_value(piece, InputSource::Paste);
    }
    f.undo();
    f.undo();
    assert_eq!(f.text_value(), "ab");
    assert!(f.undo().is_empty());
    Ok(())
}
