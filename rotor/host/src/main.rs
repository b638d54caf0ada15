//! Rotor Host - Headless Spinner Driver
//!
//! Drives a glyph rotor without any UI and reports every rotation, either as
//! human-readable log lines or as JSON lines for another process to render.
//!
//! # Usage
//!
//! ```bash
//! # Default pool, four visible glyphs, until Ctrl-C
//! rotor-host
//!
//! # Three glyphs, reproducible draws, stop after ten seconds
//! rotor-host --visible-count 3 --seed 42 --duration-secs 10
//!
//! # Machine-readable output
//! rotor-host --json
//!
//! # With config file
//! rotor-host --config ~/.config/glyph-rotor/rotor.toml
//!
//! # Verbose logging
//! RUST_LOG=debug rotor-host
//! ```
//!
//! # Signals
//!
//! - `SIGINT`: Stop the spinner and exit once the exit delay has elapsed

mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use rotor_core::{
    load_config, load_config_from_path, ConfigOverrides, RotationEvent, RotationSequencer,
    RotorConfig,
};

use report::{RotationReport, StripMirror};

/// Rotor Host - headless driver for a glyph spinner strip
#[derive(Parser, Debug)]
#[command(name = "rotor-host")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ROTOR_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of glyphs visible at once
    #[arg(short = 'n', long, value_name = "COUNT")]
    visible_count: Option<usize>,

    /// Seed for reproducible glyph draws
    #[arg(long)]
    seed: Option<u64>,

    /// Time between rotations in milliseconds
    #[arg(long, value_name = "MS")]
    cadence_ms: Option<u64>,

    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(short = 'd', long, value_name = "SECS")]
    duration_secs: Option<u64>,

    /// Print each rotation as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ROTOR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            visible_count: self.visible_count,
            seed: self.seed,
            cadence_ms: self.cadence_ms,
        }
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("rotor_host={level},rotor_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Resolve the effective configuration: file, then env, then CLI
fn resolve_config(args: &Args) -> Result<RotorConfig> {
    let loaded = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    };
    let mut config = loaded.context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// What a reporting run saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ReportSummary {
    reported: u64,
    first_tick: Option<u64>,
    last_tick: Option<u64>,
}

/// Report rotations until the sequencer goes away or `shutdown` resolves
///
/// `events` must be subscribed before the sequencer starts, otherwise the
/// ticks that land inside the settle delay are missed.
async fn report_rotations(
    sequencer: &RotationSequencer,
    mut events: broadcast::Receiver<RotationEvent>,
    mut mirror: StripMirror,
    json: bool,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<ReportSummary> {
    let mut summary = ReportSummary::default();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            received = events.recv() => match received {
                Ok(event) => {
                    if !mirror.apply(&event) {
                        debug!(tick = event.tick, "Strip out of step, resyncing");
                        mirror.resync(sequencer.visible());
                    }
                    summary.reported += 1;
                    summary.first_tick.get_or_insert(event.tick);
                    summary.last_tick = Some(event.tick);

                    if json {
                        let line = serde_json::to_string(&RotationReport {
                            event: &event,
                            strip: mirror.glyphs(),
                        })?;
                        println!("{line}");
                    } else {
                        info!(
                            tick = event.tick,
                            evicted = %event.evicted_value,
                            inserted = %event.inserted_value,
                            strip = %mirror,
                            "Rotated"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Fell behind the sequencer, resyncing");
                    mirror.resync(sequencer.visible());
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    Ok(summary)
}

/// Subscribe, then start; the returned mirror matches the freshly drawn strip
fn start_reporting(
    sequencer: &RotationSequencer,
) -> (broadcast::Receiver<RotationEvent>, StripMirror) {
    let events = sequencer.subscribe();
    let settled = sequencer.clone();
    sequencer.start(move || info!(strip = ?settled.visible(), "Spinner settled"));
    (events, StripMirror::new(sequencer.visible()))
}

/// Resolves on Ctrl-C or once `duration` has elapsed
async fn shutdown_signal(duration: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("Received SIGINT, stopping spinner");
    };

    match duration {
        Some(duration) => {
            tokio::select! {
                () = ctrl_c => {}
                () = tokio::time::sleep(duration) => info!("Run duration elapsed"),
            }
        }
        None => ctrl_c.await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Rotor Host starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&args)?;
    info!(
        source = %config.source(),
        visible_count = config.visible_count,
        pool_size = config.pool.len(),
        cadence = ?config.timing.cadence(),
        "Configuration resolved"
    );
    if let Some(ref path) = config.config_file_path {
        info!(config_path = ?path, "Config file");
    }

    let model = config.build_model().context("Failed to build glyph pool")?;
    let sequencer =
        RotationSequencer::new(model, config.timing).context("Failed to create sequencer")?;

    let (events, mirror) = start_reporting(&sequencer);
    info!(strip = %mirror, "Spinner started");

    let shutdown = shutdown_signal(args.duration_secs.map(Duration::from_secs));
    let result = report_rotations(&sequencer, events, mirror, args.json, shutdown).await;

    info!("Shutting down...");
    sequencer.stop_and_wait().await;

    match result {
        Ok(summary) => {
            info!(
                rotations = summary.reported,
                last_tick = ?summary.last_tick,
                "Rotor host stopped cleanly"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Rotor host stopped with error");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotor_core::{RotationTiming, SymbolPoolModel};

    #[test]
    fn test_args_map_to_overrides() {
        let args = Args::parse_from([
            "rotor-host",
            "--visible-count",
            "3",
            "--seed",
            "9",
            "--cadence-ms",
            "250",
        ]);
        let overrides = args.overrides();
        assert_eq!(overrides.visible_count, Some(3));
        assert_eq!(overrides.seed, Some(9));
        assert_eq!(overrides.cadence_ms, Some(250));
        assert!(!args.json);
    }

    #[test]
    fn test_config_file_and_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotor.toml");
        std::fs::write(
            &path,
            "[spinner]\nvisible_count = 2\npool = [\"a\", \"b\", \"c\"]\n",
        )
        .unwrap();

        let args = Args::parse_from([
            "rotor-host",
            "--config",
            path.to_str().unwrap(),
            "--visible-count",
            "3",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.visible_count, 3);
        assert_eq!(config.pool, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotor.toml");
        std::fs::write(&path, "[spinner]\npool = [\"a\", \"b\"]\n").unwrap();

        let args = Args::parse_from([
            "rotor-host",
            "--config",
            path.to_str().unwrap(),
            "--visible-count",
            "5",
        ]);
        assert!(resolve_config(&args).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_until_shutdown() {
        let model = SymbolPoolModel::new(2, ["a", "b", "c", "d"]).unwrap();
        let timing = RotationTiming::with_cadence(Duration::from_millis(100))
            .with_first_tick_delay(Duration::from_millis(50));
        let sequencer = RotationSequencer::new(model, timing).unwrap();
        let (events, mirror) = start_reporting(&sequencer);
        assert_eq!(mirror.glyphs(), sequencer.visible().as_slice());

        // ticks at 50, 150 and 250 fall before 300ms
        let shutdown = tokio::time::sleep(Duration::from_millis(300));
        let summary = report_rotations(&sequencer, events, mirror, false, shutdown)
            .await
            .unwrap();
        assert_eq!(summary.reported, 3);
        assert_eq!(summary.last_tick, Some(3));

        sequencer.stop_and_wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_inside_settle_delay_are_reported() {
        let model = SymbolPoolModel::new(2, ["a", "b", "c", "d"]).unwrap();
        let sequencer = RotationSequencer::new(model, RotationTiming::default()).unwrap();
        let (events, mirror) = start_reporting(&sequencer);

        // default timing: first tick at 100ms, settled at 500ms, second tick at 1500ms
        let shutdown = tokio::time::sleep(Duration::from_millis(1600));
        let summary = report_rotations(&sequencer, events, mirror, true, shutdown)
            .await
            .unwrap();
        assert_eq!(summary.first_tick, Some(1));
        assert_eq!(summary.reported, 2);

        sequencer.stop_and_wait().await;
    }
}
