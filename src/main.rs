//! Flick gesture pill service
//!
//! Reads platform signals as JSON lines on stdin, or replays a TOML script
//! with `--script`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flick_pill::backend::headless::{self, Options};
use flick_pill::demo;

#[derive(Parser, Debug)]
#[command(name = "flick-pill")]
#[command(about = "Floating gesture pill that replaces the navigation bar", long_about = None)]
struct Args {
    /// Config file (default: ~/.local/state/flick/pill_config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a TOML signal script instead of reading stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Apply overscan and immersive policy with the wm/settings tools
    #[arg(long)]
    apply_overscan: bool,

    /// Screen width in pixels
    #[arg(long, default_value_t = 1080)]
    width: i32,

    /// Screen height in pixels
    #[arg(long, default_value_t = 2340)]
    height: i32,

    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Log panics to the crash log before dying
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Ok(home) = std::env::var("HOME") {
            let crash_log = format!("{}/.local/state/flick/crash.log", home);
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                use std::io::Write;
                let _ = writeln!(f, "[{}] PANIC: {}", chrono::Local::now(), panic_info);
            }
        }
    }));

    // ~/.local/state/flick or /tmp/flick
    let log_dir = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("flick");

    std::fs::create_dir_all(&log_dir).ok();

    let args = Args::parse();

    let file_appender = rolling::daily(&log_dir, "pill.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = if args.debug {
        "debug,flick_pill=debug"
    } else {
        "warn,flick_pill=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!(log_path = %log_dir.display(), "Flick pill starting");

    if let Some(script) = args.script {
        let parts = headless::logging_collaborators(args.apply_overscan);
        let summary = demo::run(&script, parts)?;
        println!("{:#?}", summary);
        return Ok(());
    }

    headless::run(Options {
        config: args.config,
        apply_overscan: args.apply_overscan,
        width: args.width,
        height: args.height,
    })
}
