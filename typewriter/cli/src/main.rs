//! TypeWriter - Terminal Typing Animation
//!
//! Types each term one character at a time on a single terminal line,
//! pauses, erases it and moves on to the next.
//!
//! # Usage
//!
//! ```bash
//! # Loop over a few terms
//! typewriter Developer Designer Writer
//!
//! # Faster, once, without a cursor
//! typewriter --speed 60 --no-loop --no-cursor "Hello, world"
//!
//! # Terms and timing from a config file
//! typewriter --config ~/.config/typewriter/typewriter.toml
//!
//! # Frames as JSON lines
//! typewriter --json Developer | jq .visible_text
//!
//! # Verbose logging (goes to stderr)
//! RUST_LOG=debug typewriter Developer
//! ```
//!
//! # Signals
//!
//! - `SIGINT` (Ctrl-C): tear down the engine and exit

mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use typewriter_core::{
    load_config, load_config_from_path, ConfigOverrides, Delay, Phase, Speed,
    TypeWriterConfigFile, TypeWriterTask,
};

use render::{OutputMode, Renderer};

/// Commands queued between the terminal and the engine task
const COMMAND_BUFFER: usize = 8;

/// TypeWriter - Terminal typing animation
#[derive(Parser, Debug)]
#[command(name = "typewriter")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Terms to type, in order (replaces the terms from the config file)
    #[arg(value_name = "TERM")]
    terms: Vec<String>,

    /// Characters per second (10-100, in steps of 10)
    #[arg(short = 's', long, value_parser = parse_speed)]
    speed: Option<Speed>,

    /// Seconds to wait before erasing a typed term (1-10)
    #[arg(short = 'd', long, value_parser = parse_delay)]
    delay: Option<Delay>,

    /// Type the first term once and stop
    #[arg(long)]
    no_loop: bool,

    /// Never draw a cursor
    #[arg(long)]
    no_cursor: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "TYPEWRITER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print every frame as a JSON line instead of drawing it
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "TYPEWRITER_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if !self.terms.is_empty() {
            overrides = overrides.with_terms(self.terms.clone());
        }
        if let Some(speed) = self.speed {
            overrides = overrides.with_speed(speed);
        }
        if let Some(delay) = self.delay {
            overrides = overrides.with_delay(delay);
        }
        if self.no_loop {
            overrides = overrides.with_loop(false);
        }
        if self.no_cursor {
            overrides = overrides.with_cursor(false);
        }
        overrides
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Line
        }
    }
}

fn parse_speed(value: &str) -> Result<Speed, String> {
    let raw: u32 = value.parse().map_err(|e| format!("{e}"))?;
    Speed::new(raw).map_err(|e| e.to_string())
}

fn parse_delay(value: &str) -> Result<Delay, String> {
    let raw: u32 = value.parse().map_err(|e| format!("{e}"))?;
    Delay::new(raw).map_err(|e| e.to_string())
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so they never mix with the animated line.
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "typewriter_cli={level},typewriter_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(())
}

/// Load the config file and environment, then apply command line overrides
fn resolve_config(args: &Args) -> Result<TypeWriterConfigFile> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            load_config_from_path(Some(path.clone()))
        }
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    args.overrides().apply(&mut config);
    Ok(config)
}

/// Drive one engine until Ctrl-C, or until a non-looping run is done
async fn run<W: Write>(config: TypeWriterConfigFile, renderer: &mut Renderer<W>) -> Result<()> {
    let looping = config.engine.looping;
    let (handle, mut frames, task) = TypeWriterTask::spawn(COMMAND_BUFFER);

    handle
        .configure(config.terms, config.engine)
        .await
        .context("Typewriter task stopped before it was configured")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let done = handle.wait_for_phase(Phase::Done);
    tokio::pin!(done);

    loop {
        tokio::select! {
            biased;

            frame = frames.recv() => match frame {
                Some(frame) => renderer.draw(&frame).context("Failed to draw frame")?,
                None => break,
            },

            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, stopping");
                break;
            }

            _ = &mut done, if !looping => {
                debug!("Typewriter finished");
                break;
            }
        }
    }

    // The last frames may still be queued behind the phase change
    while let Ok(frame) = frames.try_recv() {
        renderer.draw(&frame).context("Failed to draw frame")?;
    }

    if handle.shutdown().await.is_err() {
        debug!("Typewriter task already stopped");
    }
    let last = task.await.context("Typewriter task panicked")?;
    debug!(
        text = %last.visible_text,
        frames = renderer.drawn(),
        "Typewriter stopped"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let config = resolve_config(&args)?;
    info!(
        terms = config.terms.len(),
        speed = %config.engine.speed,
        delay = %config.engine.delay,
        looping = config.engine.looping,
        cursor = config.engine.cursor,
        source = %config.source(),
        "Starting typewriter"
    );

    if config.terms.iter().all(String::is_empty) {
        warn!("No terms to type");
        return Ok(());
    }

    let mut renderer = Renderer::new(io::stdout(), args.output_mode());
    let result = run(config, &mut renderer).await;
    renderer.finish().context("Failed to finish output")?;
    result
}
