//! textfield-replay entrypoint.
//!
//! Replays a TOML edit script against a single field laid out with a
//! fixed-advance layout and prints every callback, the outcome of each step,
//! and the final field state.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::TextField;
use core_config::load_from;
use core_model::FixedAdvanceLayout;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod script;

use script::{Script, Transcript};

const DEFAULT_WIDTH: f32 = 200.0;
const GLYPH_ADVANCE: f32 = 10.0;
const LINE_HEIGHT: f32 = 20.0;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "textfield-replay", version, about = "Replay edit scripts against a text field")]
struct Args {
    /// Script to replay (TOML, one `[[step]]` table per operation).
    pub script: PathBuf,
    /// Optional configuration file path (overrides discovery of `textfield.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Container width; overrides the script's `width`.
    #[arg(long)]
    pub width: Option<f32>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("textfield-replay.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "textfield-replay.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    // An already-installed subscriber drops the guard so the writer shuts down.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn load_script(path: &Path) -> Result<Script> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    toml::from_str(&source).with_context(|| format!("parsing script {}", path.display()))
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let script = load_script(&args.script)?;
    let width = args.width.or(script.width).unwrap_or(DEFAULT_WIDTH);
    info!(
        target: "runtime",
        script = %args.script.display(),
        steps = script.steps.len(),
        width,
        "startup"
    );

    let layout = FixedAdvanceLayout::new(GLYPH_ADVANCE, LINE_HEIGHT)
        .with_direction(config.file.field.direction);
    let mut field = TextField::from_config(&config, layout, width);
    let transcript = Transcript::default();
    field.add_listener(transcript.listener());

    for step in &script.steps {
        let outcome = script::apply(&mut field, step);
        transcript.push(format!("{} -> {outcome}", step.name()));
    }
    let pending = field.process_frame();
    if !pending.is_empty() {
        transcript.push(format!("frame -> {pending:?}"));
    }

    for line in transcript.lines() {
        println!("{line}");
    }
    println!("--");
    for line in script::summary(&field) {
        println!("{line}");
    }
    info!(target: "runtime", "shutdown");
    Ok(())
}
