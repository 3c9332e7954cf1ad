//! Configuration loading and parsing.
//!
//! Parses `textfield.toml` (or an override path provided by the binary). Every
//! section and field is optional; missing values take the defaults below and
//! unknown fields are ignored so the file can grow without warnings.
//!
//! ```toml
//! [field]
//! max_length = 20
//! input_filter = "[0-9]"
//! filter_mode = "allow"     # allow | deny
//! input_type = "normal"     # normal | number | number_decimal | phone | email | password
//! copy_options = "local"    # none | in_app | local | distributed
//! text_align = "start"      # start | end | center | justify
//! direction = "ltr"         # ltr | rtl
//!
//! [caret]
//! width = 2.0
//!
//! [preview]
//! enabled = true
//! on_focus_loss = "keep"    # keep | commit | discard
//!
//! [undo]
//! history = 100
//! ```
//!
//! A missing file or a parse error yields the defaults (the parse error is
//! logged). An invalid `input_filter` regex disables the user filter rather
//! than failing the load.

use anyhow::Result;
use core_model::{TextAlign, TextDirection};
use core_state::{CopyOptions, FocusLossPolicy, UNDO_HISTORY_MAX};
use core_text::{ContentPolicy, FilterMode, InputFilter, InputType};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FieldConfig {
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub input_filter: Option<String>,
    #[serde(default)]
    pub filter_mode: FilterMode,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub copy_options: CopyOptions,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub direction: TextDirection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaretConfig {
    #[serde(default = "CaretConfig::default_width")]
    pub width: f32,
}

impl Default for CaretConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
        }
    }
}

impl CaretConfig {
    const fn default_width() -> f32 {
        2.0
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    #[serde(default = "PreviewConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub on_focus_loss: FocusLossPolicy,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            on_focus_loss: FocusLossPolicy::default(),
        }
    }
}

impl PreviewConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_history")]
    pub history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            history: Self::default_history(),
        }
    }
}

impl UndoConfig {
    const fn default_history() -> usize {
        UNDO_HISTORY_MAX
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub caret: CaretConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("textfield.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("textfield").join("textfield.toml");
    }
    PathBuf::from("textfield.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Buffer admission policy. A bad regex is logged and dropped.
    pub fn content_policy(&self) -> ContentPolicy {
        let field = &self.file.field;
        let filter = field.input_filter.as_deref().and_then(|pattern| {
            match InputFilter::new(pattern, field.filter_mode) {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!(
                        target: "config",
                        code = e.code(),
                        error = %e,
                        "input_filter_invalid_ignored"
                    );
                    None
                }
            }
        });
        ContentPolicy {
            max_length: field.max_length,
            input_type: field.input_type,
            filter,
        }
    }

    /// Caret width with non-finite or non-positive values replaced by the default.
    pub fn caret_width(&self) -> f32 {
        let raw = self.file.caret.width;
        if raw.is_finite() && raw > 0.0 {
            return raw;
        }
        let fallback = CaretConfig::default_width();
        info!(target: "config", raw, fallback, "caret_width_clamped");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
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

    fn capture<F: FnOnce()>(f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    fn load_str(toml: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), toml).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file.field.max_length, None);
        assert_eq!(cfg.file.field.copy_options, CopyOptions::Local);
        assert_eq!(cfg.file.caret.width, 2.0);
        assert!(cfg.file.preview.enabled);
        assert_eq!(cfg.file.preview.on_focus_loss, FocusLossPolicy::Keep);
        assert_eq!(cfg.file.undo.history, UNDO_HISTORY_MAX);
    }

    #[test]
    fn parses_every_section() {
        let cfg = load_str(
            "[field]\nmax_length = 8\ninput_filter = \"[0-9]\"\nfilter_mode = \"deny\"\n\
             input_type = \"number_decimal\"\ncopy_options = \"none\"\n\
             text_align = \"center\"\ndirection = \"rtl\"\n\
             [caret]\nwidth = 1.5\n[preview]\nenabled = false\non_focus_loss = \"discard\"\n\
             [undo]\nhistory = 7\n",
        );
        let f = &cfg.file.field;
        assert_eq!(f.max_length, Some(8));
        assert_eq!(f.filter_mode, FilterMode::Deny);
        assert_eq!(f.input_type, InputType::NumberDecimal);
        assert_eq!(f.copy_options, CopyOptions::None);
        assert_eq!(f.text_align, TextAlign::Center);
        assert_eq!(f.direction, TextDirection::Rtl);
        assert_eq!(cfg.caret_width(), 1.5);
        assert!(!cfg.file.preview.enabled);
        assert_eq!(cfg.file.preview.on_focus_loss, FocusLossPolicy::Discard);
        assert_eq!(cfg.file.undo.history, 7);
        let policy = cfg.content_policy();
        assert_eq!(policy.max_length, Some(8));
        assert_eq!(policy.filter.map(|f| f.mode()), Some(FilterMode::Deny));
    }

    #[test]
    fn password_fields_parse() {
        let cfg = load_str("[field]\ninput_type = \"password\"\ncopy_options = \"in_app\"\n");
        assert_eq!(cfg.content_policy().input_type, InputType::Password);
        assert_eq!(cfg.file.field.copy_options, CopyOptions::InApp);
    }

    #[test]
    fn parse_error_falls_back_and_logs() {
        let out = capture(|| {
            let cfg = load_str("[field\nmax_length = ");
            assert!(cfg.raw.is_none());
            assert_eq!(cfg.file.field.max_length, None);
        });
        assert!(out.contains("WARN config:"));
        assert!(out.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn invalid_filter_is_ignored_with_warning() {
        let cfg = load_str("[field]\ninput_filter = \"[\"\n");
        let out = capture(|| {
            assert!(cfg.content_policy().filter.is_none());
        });
        assert!(out.contains("input_filter_invalid_ignored"));
    }

    #[test]
    fn degenerate_caret_width_uses_default() {
        let cfg = load_str("[caret]\nwidth = -3.0\n");
        let out = capture(|| assert_eq!(cfg.caret_width(), 2.0));
        assert!(out.contains("INFO config:"));
        assert!(out.contains("caret_width_clamped"));
    }
}
